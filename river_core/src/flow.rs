//! Flow propagation from headwaters to the outlet.
//!
//! Every headwater injects `source_flow` units. A vertex is released to the work
//! queue once all of its qualifying upstream edges have delivered their flow, so
//! each river edge is written exactly once with its final value. Values are
//! committed to the network only when the whole pass succeeds.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

use thiserror::Error;

use crate::graph::{RiverNetwork, VertexId};
use crate::kind::VertexKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyFault {
    /// River vertices that were never released (cycle or vertex with no upstream source).
    Stalled(Vec<VertexId>),
    /// Vertex with more than one qualifying downstream link.
    Branching { vertex: VertexId, outflows: usize },
}

impl fmt::Display for TopologyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyFault::Stalled(vertices) => {
                let ids: Vec<String> = vertices.iter().map(VertexId::to_string).collect();
                write!(f, "vertices never reached: {}", ids.join(", "))
            }
            TopologyFault::Branching { vertex, outflows } => {
                write!(f, "vertex {vertex} has {outflows} downstream river links")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("river topology violated: {0}")]
    TopologyViolation(TopologyFault),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowSummary {
    pub headwaters: usize,
    /// Vertices popped from the work queue.
    pub processed: usize,
    /// Total flow that arrived at (or, for headwaters, was injected into) each vertex.
    pub inflow: BTreeMap<VertexId, u32>,
    pub outlet_flow: Option<u32>,
}

impl FlowSummary {
    pub fn inflow_at(&self, vertex: VertexId) -> u32 {
        self.inflow.get(&vertex).copied().unwrap_or(0)
    }
}

/// Compute and store the flow rate of every qualifying river edge.
///
/// Non-river edges are reset to no flow. On error the network is left as it was.
pub fn populate_flow_rate(network: &mut RiverNetwork) -> Result<FlowSummary, FlowError> {
    let (rates, summary) = match propagate(network) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(target: "river_core::flow", error = %err, "flow.populate_failed");
            return Err(err);
        }
    };

    for (edge, rate) in network.edges_mut().iter_mut().zip(rates) {
        edge.set_flow_rate(rate);
    }

    tracing::info!(
        target: "river_core::flow",
        headwaters = summary.headwaters,
        processed = summary.processed,
        outlet_flow = ?summary.outlet_flow,
        "flow.populated"
    );
    Ok(summary)
}

fn propagate(network: &RiverNetwork) -> Result<(Vec<Option<u32>>, FlowSummary), FlowError> {
    let source_flow = network.rules().source_flow;
    let mut rates = vec![None; network.edges().len()];
    let mut in_degree: HashMap<VertexId, usize> = HashMap::new();
    let mut inflow: HashMap<VertexId, u32> = HashMap::new();
    let mut linked: HashSet<VertexId> = HashSet::new();
    let mut queue = VecDeque::new();
    let mut headwaters = 0;

    for vertex in network.vertices() {
        if !network.is_river_vertex(vertex.id) {
            continue;
        }
        if vertex.kind == VertexKind::Headwater {
            headwaters += 1;
            inflow.insert(vertex.id, source_flow);
            queue.push_back(vertex.id);
        }

        let mut outflows = 0;
        for edge in network.river_successors(vertex.id) {
            outflows += 1;
            *in_degree.entry(edge.target).or_default() += 1;
            linked.insert(edge.source);
            linked.insert(edge.target);
        }
        if outflows > 1 {
            return Err(FlowError::TopologyViolation(TopologyFault::Branching {
                vertex: vertex.id,
                outflows,
            }));
        }
    }

    let mut processed = HashSet::new();
    while let Some(current) = queue.pop_front() {
        let arriving = inflow.get(&current).copied().unwrap_or(0);
        for &index in network.outgoing_indices(current) {
            let edge = network.edge(index);
            if !network.is_river_edge(edge.source, edge.target) {
                continue;
            }
            rates[index.index()] = Some(arriving);
            *inflow.entry(edge.target).or_default() += arriving;

            let remaining = in_degree.entry(edge.target).or_default();
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                queue.push_back(edge.target);
            }
        }
        processed.insert(current);
    }

    let stalled: Vec<VertexId> = network
        .vertices()
        .filter(|vertex| linked.contains(&vertex.id) && !processed.contains(&vertex.id))
        .map(|vertex| vertex.id)
        .collect();
    if !stalled.is_empty() {
        return Err(FlowError::TopologyViolation(TopologyFault::Stalled(stalled)));
    }

    let summary = FlowSummary {
        headwaters,
        processed: processed.len(),
        outlet_flow: inflow.get(&network.outlet()).copied(),
        inflow: inflow.into_iter().collect(),
    };
    Ok((rates, summary))
}
