//! Error types for routing and worker dispatch.

use thiserror::Error;

use crate::geom::Point;

/// Errors surfaced by grid operations.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Routing was requested before both endpoints were selected.
    #[error("routing requires both start and finish to be set")]
    EndpointsNotSet,

    /// No chain of open passages links the endpoints.
    #[error("finish {finish} is unreachable from start {start}")]
    UnreachableTarget { start: Point, finish: Point },

    /// Path reconstruction found no neighbor one hop closer to the start.
    ///
    /// The distance map is corrupt; the route is abandoned rather than
    /// looping forever.
    #[error("no open neighbor of {at} at distance {expected}")]
    InconsistentDistances { at: Point, expected: i32 },

    /// Another generation or routing run is already in progress.
    #[error("another maze operation is already running")]
    Busy,
}
