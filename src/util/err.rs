/// Converts errors from their module error type to a variant of the
/// crate-level [`Error`](crate::Error).
macro_rules! impl_err {
    ($from:ty, $variant:ident) => {
        impl From<$from> for crate::Error {
            fn from(value: $from) -> Self {
                crate::Error::$variant(value)
            }
        }
    };
}

pub(crate) use impl_err;
