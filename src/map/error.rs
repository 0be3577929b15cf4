#[derive(Debug)]
pub enum MapError {
    /// The road's polyline has fewer than two vertices or no extent.
    DegenerateGeometry(i64),
    /// The road's length is not strictly positive.
    InvalidLength(i64),
    /// A maxspeed of the road is not strictly positive.
    InvalidSpeed(i64),
    /// The road's priority factor is below one.
    InvalidPriority(i64),
}
