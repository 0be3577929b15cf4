#[derive(Debug)]
pub enum RouteError {
    /// A path needs at least one edge.
    EmptyPath,
    /// Consecutive path edges are not topologically connected.
    DisconnectedPath { from: i64, to: i64 },
    /// The path's source point does not lie on its first edge.
    MisplacedSource { edge: i64 },
    /// The path's target point does not lie on its last edge.
    MisplacedTarget { edge: i64 },
    /// A single-edge path running against its edge's direction.
    InvertedFractions { edge: i64 },
}
