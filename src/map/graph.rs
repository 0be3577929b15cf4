use crate::map::base::{BaseRoad, Direction};
use crate::map::error::MapError;
use crate::map::index::{IndexedEdge, SpatialIndex};
use crate::map::point::RoadPoint;
use crate::map::road::{Heading, Road};
use crate::spatial;

use geo::Point;
use itertools::Itertools;
use log::info;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Yields the road records a [`RoadMap`] is built from. Ordering is
/// irrelevant; construction is a single pass.
pub trait RoadProvider {
    type Error;

    fn roads(&self) -> Result<Vec<BaseRoad>, Self::Error>;
}

/// The directed road graph with its spatial index.
///
/// Vertices are the provider's deduplicated vertex ids; edges are the
/// directed [`Road`] projections of each record. Built once, immutable
/// during matching, safe for concurrent read.
pub struct RoadMap {
    graph: DiGraph<i64, Road>,
    vertices: FxHashMap<i64, NodeIndex>,
    edges: FxHashMap<i64, EdgeIndex>,
    index: SpatialIndex,
}

impl RoadMap {
    /// Builds the graph from road records, failing on the first record
    /// that violates the map invariants.
    pub fn from_roads(roads: impl IntoIterator<Item = BaseRoad>) -> Result<Self, MapError> {
        let mut graph = DiGraph::new();
        let mut vertices = FxHashMap::default();
        let mut edges = FxHashMap::default();
        let mut entries = Vec::new();

        for base in roads {
            base.validate()?;
            let base = Arc::new(base);

            let headings: &[Heading] = match base.direction {
                Direction::Forward => &[Heading::Forward],
                Direction::Backward => &[Heading::Backward],
                Direction::Both => &[Heading::Forward, Heading::Backward],
            };

            for &heading in headings {
                let road = Road::new(Arc::clone(&base), heading);

                let source = *vertices
                    .entry(road.source())
                    .or_insert_with(|| graph.add_node(road.source()));
                let target = *vertices
                    .entry(road.target())
                    .or_insert_with(|| graph.add_node(road.target()));

                let id = road.id();
                let index = graph.add_edge(source, target, road);
                edges.insert(id, index);
            }

            // One envelope per record; the twin projects through it.
            let representative = match base.direction {
                Direction::Backward => base.id * 2 + 1,
                _ => base.id * 2,
            };
            entries.push(IndexedEdge::new(representative, &base.geometry));
        }

        let index = SpatialIndex::build(entries);
        info!(
            "road map built with {} vertices, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(RoadMap {
            graph,
            vertices,
            edges,
            index,
        })
    }

    pub fn from_provider<P: RoadProvider>(provider: &P) -> Result<Self, crate::Error>
    where
        crate::Error: From<P::Error>,
    {
        let roads = provider.roads()?;
        Ok(Self::from_roads(roads)?)
    }

    /// The directed edge with the given id.
    #[inline]
    pub fn edge(&self, id: i64) -> Option<&Road> {
        self.edges.get(&id).and_then(|index| self.graph.edge_weight(*index))
    }

    /// Outgoing edges from the edge's target vertex, in ascending edge
    /// id order so downstream iteration is deterministic.
    pub fn successors<'a>(&'a self, road: &Road) -> impl Iterator<Item = &'a Road> + 'a {
        let target = road.target();
        self.vertices
            .get(&target)
            .into_iter()
            .flat_map(|vertex| {
                self.graph
                    .edges_directed(*vertex, petgraph::Direction::Outgoing)
                    .map(|edge| edge.weight())
            })
            .sorted_by_key(|road| road.id())
    }

    /// All road points projecting `point` onto edges whose geometry
    /// comes within `radius` meters.
    ///
    /// Both directed edges of a two-way record appear, sharing the
    /// geometric point with mirrored fractions. Results are ordered by
    /// edge id.
    pub fn radius(&self, point: &Point<f64>, radius: f64) -> Vec<RoadPoint> {
        let mut points = Vec::new();

        for id in self.index.within(point, radius).collect::<Vec<_>>() {
            let Some(road) = self.edge(id) else { continue };

            let (projected, fraction) = spatial::project(road.geometry(), point);
            if spatial::distance(point, &projected) > radius {
                continue;
            }

            points.push(RoadPoint::new(road.clone(), fraction));
            if let Some(sibling) = road.sibling().and_then(|id| self.edge(id)) {
                points.push(RoadPoint::new(sibling.clone(), 1.0 - fraction));
            }
        }

        points.sort_by(|a, b| a.road().id().cmp(&b.road().id()));
        points
    }

    /// Number of directed edges.
    pub fn size(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }
}

impl Debug for RoadMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RoadMap with {} vertices, {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        )
    }
}
