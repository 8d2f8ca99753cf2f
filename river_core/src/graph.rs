//! Vertex/edge storage for the river network.
//!
//! Vertices live in an insertion-ordered arena keyed by [`VertexId`]; each vertex
//! keeps the indices of its outgoing edges in the order they were added. The
//! river-typed part of the graph is expected to be a tree oriented toward a
//! single outlet, but the storage itself accepts any number of outgoing links so
//! auxiliary (non-river) connections can sit alongside the river topology.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kind::{RiverKinds, VertexKind};

/// Identifier of a vertex as it appears in the source data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer map coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position of an edge inside the network's edge table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(usize);

impl EdgeIndex {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub coord: Coord,
    pub kind: VertexKind,
    /// Type label exactly as supplied by the loader.
    pub label: String,
    outgoing: Vec<EdgeIndex>,
}

impl Vertex {
    pub fn outgoing(&self) -> &[EdgeIndex] {
        &self.outgoing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    weight: Option<f64>,
    flow_rate: Option<u32>,
}

impl Edge {
    fn new(source: VertexId, target: VertexId) -> Self {
        Self {
            source,
            target,
            weight: None,
            flow_rate: None,
        }
    }

    /// Euclidean length, available once distances have been populated.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Accumulated headwater count, available on river edges once flow has been populated.
    pub fn flow_rate(&self) -> Option<u32> {
        self.flow_rate
    }

    pub(crate) fn set_weight(&mut self, weight: f64) {
        self.weight = Some(weight);
    }

    pub(crate) fn set_flow_rate(&mut self, flow_rate: Option<u32>) {
        self.flow_rate = flow_rate;
    }
}

/// What to do when a vertex id is inserted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    FailFast,
    /// Keep the first record, log the duplicate and carry on.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Skipped,
}

/// Immutable rules deciding which links count as river.
#[derive(Debug, Clone)]
pub struct NetworkRules {
    pub river_kinds: RiverKinds,
    pub non_river_blacklist: HashSet<(VertexId, VertexId)>,
    pub outlet: VertexId,
    /// Flow injected by every headwater.
    pub source_flow: u32,
}

impl Default for NetworkRules {
    fn default() -> Self {
        Self {
            river_kinds: RiverKinds::default(),
            non_river_blacklist: HashSet::new(),
            outlet: VertexId(1),
            source_flow: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("vertex {0} is already in the network")]
    DuplicateVertex(VertexId),
    #[error("vertex {0} is not in the network")]
    UnknownVertex(VertexId),
}

#[derive(Debug, Clone)]
pub struct RiverNetwork {
    rules: NetworkRules,
    vertices: Vec<Vertex>,
    index: HashMap<VertexId, usize>,
    edges: Vec<Edge>,
}

impl RiverNetwork {
    pub fn new(rules: NetworkRules) -> Self {
        Self {
            rules,
            vertices: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    pub fn rules(&self) -> &NetworkRules {
        &self.rules
    }

    pub fn outlet(&self) -> VertexId {
        self.rules.outlet
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.index.get(&id).map(|&slot| &self.vertices[slot])
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + Clone + '_ {
        self.vertices.iter()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.edges[index.0]
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn add_vertex(
        &mut self,
        id: VertexId,
        coord: Coord,
        kind: VertexKind,
    ) -> Result<(), GraphError> {
        self.add_vertex_with(DuplicatePolicy::FailFast, id, coord, kind, kind.as_str())
            .map(|_| ())
    }

    pub fn add_vertex_with(
        &mut self,
        policy: DuplicatePolicy,
        id: VertexId,
        coord: Coord,
        kind: VertexKind,
        label: impl Into<String>,
    ) -> Result<InsertOutcome, GraphError> {
        if self.index.contains_key(&id) {
            return match policy {
                DuplicatePolicy::FailFast => Err(GraphError::DuplicateVertex(id)),
                DuplicatePolicy::Skip => {
                    tracing::warn!(
                        target: "river_core::graph",
                        vertex = %id,
                        coord = %coord,
                        "vertex.duplicate=skipped"
                    );
                    Ok(InsertOutcome::Skipped)
                }
            };
        }
        self.index.insert(id, self.vertices.len());
        self.vertices.push(Vertex {
            id,
            coord,
            kind,
            label: label.into(),
            outgoing: Vec::new(),
        });
        Ok(InsertOutcome::Inserted)
    }

    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
    ) -> Result<EdgeIndex, GraphError> {
        let slot = *self
            .index
            .get(&source)
            .ok_or(GraphError::UnknownVertex(source))?;
        if !self.index.contains_key(&target) {
            return Err(GraphError::UnknownVertex(target));
        }
        let edge = EdgeIndex(self.edges.len());
        self.edges.push(Edge::new(source, target));
        self.vertices[slot].outgoing.push(edge);
        Ok(edge)
    }

    pub fn has_edge(&self, source: VertexId, target: VertexId) -> bool {
        self.outgoing_edges(source).any(|edge| edge.target == target)
    }

    /// Outgoing edges of `id` in insertion order; empty when `id` is absent.
    pub fn outgoing_edges(&self, id: VertexId) -> impl Iterator<Item = &Edge> + Clone + '_ {
        self.outgoing_indices(id)
            .iter()
            .map(move |edge| &self.edges[edge.0])
    }

    pub(crate) fn outgoing_indices(&self, id: VertexId) -> &[EdgeIndex] {
        self.vertex(id)
            .map(|vertex| vertex.outgoing.as_slice())
            .unwrap_or(&[])
    }

    pub fn edge_between(&self, source: VertexId, target: VertexId) -> Option<&Edge> {
        self.outgoing_edges(source).find(|edge| edge.target == target)
    }

    pub fn is_river_vertex(&self, id: VertexId) -> bool {
        self.vertex(id)
            .is_some_and(|vertex| self.rules.river_kinds.includes(vertex.kind))
    }

    /// A link is river when both ends are river-typed, it does not flow into a
    /// headwater and it is not one of the blacklisted coincidental links.
    pub fn is_river_edge(&self, source: VertexId, target: VertexId) -> bool {
        let (Some(from), Some(to)) = (self.vertex(source), self.vertex(target)) else {
            return false;
        };
        if !self.rules.river_kinds.includes(from.kind) || !self.rules.river_kinds.includes(to.kind)
        {
            return false;
        }
        if to.kind == VertexKind::Headwater {
            return false;
        }
        !self.rules.non_river_blacklist.contains(&(source, target))
    }

    /// Qualifying river edges leaving `id`.
    pub fn river_successors(&self, id: VertexId) -> impl Iterator<Item = &Edge> + Clone + '_ {
        self.outgoing_edges(id)
            .filter(move |edge| self.is_river_edge(edge.source, edge.target))
    }

    pub fn headwaters(&self) -> impl Iterator<Item = &Vertex> + Clone + '_ {
        self.vertices
            .iter()
            .filter(|vertex| vertex.kind == VertexKind::Headwater)
    }

    pub fn junctions(&self) -> impl Iterator<Item = &Vertex> + Clone + '_ {
        self.vertices
            .iter()
            .filter(|vertex| vertex.kind == VertexKind::Junction)
    }
}
