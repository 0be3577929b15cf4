//! Geodesy primitives on the WGS-84 ellipsoid.
//!
//! Every distance, heading and interpolation the matcher performs goes
//! through this module, so results are deterministic and independent of
//! the calling thread.

#[doc(hidden)]
pub mod geodesy;

#[doc(inline)]
pub use geodesy::*;
