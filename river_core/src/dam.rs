//! What-if analysis for damming the river just below a junction.
//!
//! The dam is assumed to hold back everything the dammed edge carried, so every
//! edge further downstream loses exactly that amount. Stored flow rates are left
//! untouched; the result is a report.

use thiserror::Error;

use crate::distance::distance;
use crate::graph::{Coord, RiverNetwork, VertexId};
use crate::traversal::{downstream_path, TraversalError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DamError {
    #[error("network has no junction to dam")]
    NoJunction,
    #[error("junction {0} has no downstream river link")]
    NoDownstreamRiver(VertexId),
    #[error("edge {from} -> {to} has no flow rate; populate flow first")]
    FlowNotPopulated { from: VertexId, to: VertexId },
    #[error(transparent)]
    Unreachable(#[from] TraversalError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamFlow {
    pub from: VertexId,
    pub to: VertexId,
    pub original: u32,
    pub adjusted: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamReport {
    pub junction: VertexId,
    /// Target of the dammed edge.
    pub dammed_target: VertexId,
    /// Flow carried by the dammed edge before the dam.
    pub removed: u32,
    /// Every edge from the dammed edge's target down to the outlet.
    pub downstream: Vec<DownstreamFlow>,
}

/// Junction closest to `at`; the first one seen wins ties.
pub fn nearest_junction(network: &RiverNetwork, at: Coord) -> Option<VertexId> {
    let mut best: Option<(VertexId, f64)> = None;
    for junction in network.junctions() {
        let gap = distance(at, junction.coord);
        if best.map_or(true, |(_, closest)| gap < closest) {
            best = Some((junction.id, gap));
        }
    }
    best.map(|(id, _)| id)
}

/// Dam the downstream river edge of the junction nearest to `at`.
pub fn simulate_dam(network: &RiverNetwork, at: Coord) -> Result<DamReport, DamError> {
    let junction = nearest_junction(network, at).ok_or(DamError::NoJunction)?;
    let dammed = network
        .river_successors(junction)
        .next()
        .ok_or(DamError::NoDownstreamRiver(junction))?;
    let removed = dammed.flow_rate().ok_or(DamError::FlowNotPopulated {
        from: dammed.source,
        to: dammed.target,
    })?;

    let path = downstream_path(network, dammed.target)?;
    let mut downstream = Vec::with_capacity(path.len().saturating_sub(1));
    for step in path.windows(2) {
        let (from, to) = (step[0], step[1]);
        let original = network
            .river_successors(from)
            .find(|edge| edge.target == to)
            .and_then(|edge| edge.flow_rate())
            .ok_or(DamError::FlowNotPopulated { from, to })?;
        downstream.push(DownstreamFlow {
            from,
            to,
            original,
            adjusted: original.saturating_sub(removed),
        });
    }

    tracing::info!(
        target: "river_core::dam",
        junction = %junction,
        at = %at,
        removed,
        downstream_edges = downstream.len(),
        "dam.simulated"
    );
    Ok(DamReport {
        junction,
        dammed_target: dammed.target,
        removed,
        downstream,
    })
}
