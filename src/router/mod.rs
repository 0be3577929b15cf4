//! Cost functions and the bounded multi-target router.
//!
//! [`Dijkstra::route`] expands a single source [`RoadPoint`](crate::map::RoadPoint)
//! towards many targets at once, keyed by a [`Cost`] and pruned by a
//! separate bound. Unreachable targets yield `None`, never errors.

pub mod cost;
#[doc(hidden)]
pub mod dijkstra;
pub mod error;
#[doc(hidden)]
pub mod path;
#[doc(hidden)]
mod test;

#[doc(inline)]
pub use cost::{Cost, Distance, DistancePriority, Time, TimePriority};
#[doc(inline)]
pub use dijkstra::{Bounds, Dijkstra};
#[doc(inline)]
pub use path::Path;
