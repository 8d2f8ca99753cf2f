use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use crate::graph::{RiverNetwork, VertexId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    #[error("vertex {0} is not in the network")]
    UnknownVertex(VertexId),
    #[error("outlet {outlet} is not reachable from vertex {from}")]
    UnreachableOutlet { from: VertexId, outlet: VertexId },
}

/// Breadth-first search along qualifying river edges from `from` to the outlet.
///
/// The returned path starts at `from` and ends at the outlet.
pub fn downstream_path(
    network: &RiverNetwork,
    from: VertexId,
) -> Result<Vec<VertexId>, TraversalError> {
    if !network.contains(from) {
        return Err(TraversalError::UnknownVertex(from));
    }
    let outlet = network.outlet();

    let mut parents: HashMap<VertexId, VertexId> = HashMap::new();
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);

    while let Some(current) = queue.pop_front() {
        if current == outlet {
            let mut path = vec![current];
            let mut cursor = current;
            while let Some(&parent) = parents.get(&cursor) {
                path.push(parent);
                cursor = parent;
            }
            path.reverse();
            return Ok(path);
        }
        for edge in network.river_successors(current) {
            if visited.insert(edge.target) {
                parents.insert(edge.target, current);
                queue.push_back(edge.target);
            }
        }
    }

    Err(TraversalError::UnreachableOutlet { from, outlet })
}
