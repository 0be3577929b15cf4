//! Online hidden Markov model map matching.
//!
//! Matches a stream of noisy position fixes against a directed road
//! network, inferring for every sample the most probable on-road
//! positions together with the routes taken between them.
//!
//! The crate is split along the pipeline:
//! - [`spatial`]: WGS-84 geodesy primitives,
//! - [`map`]: the routable road graph and its spatial index,
//! - [`router`]: cost functions and the bounded multi-target router,
//! - [`markov`]: the generic HMM filter and sliding state window,
//! - [`matcher`]: the concrete matcher wiring it all together.

use crate::map::error::MapError;
use crate::matcher::error::MatchError;
use crate::router::error::RouteError;

pub mod map;
pub mod markov;
pub mod matcher;
pub mod router;
pub mod spatial;
pub(crate) mod util;

use crate::util::err::impl_err;

#[derive(Debug)]
pub enum Error {
    Map(MapError),
    Route(RouteError),
    Match(MatchError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl_err!(MapError, Map);
impl_err!(RouteError, Route);
impl_err!(MatchError, Match);
