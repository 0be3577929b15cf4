//! The routable road network.
//!
//! A [`BaseRoad`] is the immutable record a road provider yields. Each
//! record projects into one or two directed [`Road`] edges of the
//! [`RoadMap`], which pairs the graph with an [`index`](SpatialIndex)
//! for radius searches returning [`RoadPoint`]s.

#[doc(hidden)]
pub mod base;
pub mod error;
#[doc(hidden)]
pub mod graph;
#[doc(hidden)]
pub mod index;
#[doc(hidden)]
pub mod point;
#[doc(hidden)]
pub mod road;

#[doc(inline)]
pub use base::{BaseRoad, Direction};
#[doc(inline)]
pub use graph::{RoadMap, RoadProvider};
#[doc(inline)]
pub use index::SpatialIndex;
#[doc(inline)]
pub use point::RoadPoint;
#[doc(inline)]
pub use road::{Heading, Road};
