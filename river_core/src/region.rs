//! Bounding-box queries and flow ranking of junctions.

use std::cmp::Ordering;

use thiserror::Error;

use crate::graph::{Coord, RiverNetwork, VertexId};
use crate::kind::VertexKind;
use crate::river_config::MapExtent;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("region corner {corner} lies outside the map extent [{min}, {max}]")]
    InvalidRegion { corner: Coord, min: i32, max: i32 },
    #[error("edge {from} -> {to} has no flow rate; populate flow first")]
    FlowNotPopulated { from: VertexId, to: VertexId },
}

/// Inclusive axis-aligned rectangle given by its top-left and bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub top_left: Coord,
    pub bottom_right: Coord,
}

impl Region {
    /// Build a region whose corners are both inside `extent`.
    pub fn new(
        top_left: Coord,
        bottom_right: Coord,
        extent: &MapExtent,
    ) -> Result<Self, RegionError> {
        for corner in [top_left, bottom_right] {
            if !extent.contains(corner) {
                return Err(RegionError::InvalidRegion {
                    corner,
                    min: extent.min,
                    max: extent.max,
                });
            }
        }
        Ok(Self::from_corners(top_left, bottom_right))
    }

    pub const fn from_corners(top_left: Coord, bottom_right: Coord) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.top_left.x <= coord.x
            && coord.x <= self.bottom_right.x
            && self.top_left.y <= coord.y
            && coord.y <= self.bottom_right.y
    }
}

/// Ids of every vertex inside `region`, in network insertion order.
pub fn vertices_in_region(network: &RiverNetwork, region: &Region) -> Vec<VertexId> {
    network
        .vertices()
        .filter(|vertex| region.contains(vertex.coord))
        .map(|vertex| vertex.id)
        .collect()
}

/// Stable bottom-up merge sort.
///
/// Runs of width 1, 2, 4, ... are merged pairwise until a single run remains.
/// When `compare` reports two items equal the one that came first stays first.
pub fn merge_sort_by<T, F>(items: &mut Vec<T>, mut compare: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut scratch = items.clone();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            for slot in scratch[start..end].iter_mut() {
                let take_left = right >= end
                    || (left < mid && compare(&items[right], &items[left]) != Ordering::Less);
                if take_left {
                    *slot = items[left].clone();
                    left += 1;
                } else {
                    *slot = items[right].clone();
                    right += 1;
                }
            }
            start = end;
        }
        std::mem::swap(items, &mut scratch);
        width *= 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedJunction {
    pub id: VertexId,
    /// Flow on the junction's downstream river edge.
    pub flow: u32,
}

/// Junctions inside `region` ordered from highest to lowest downstream flow.
///
/// Junctions without a qualifying downstream edge are left out.
pub fn rank_junctions_by_flow(
    network: &RiverNetwork,
    region: &Region,
) -> Result<Vec<RankedJunction>, RegionError> {
    let mut ranked = Vec::new();
    for id in vertices_in_region(network, region) {
        let Some(vertex) = network.vertex(id) else {
            continue;
        };
        if vertex.kind != VertexKind::Junction {
            continue;
        }
        let Some(edge) = network.river_successors(id).next() else {
            continue;
        };
        let flow = edge.flow_rate().ok_or(RegionError::FlowNotPopulated {
            from: edge.source,
            to: edge.target,
        })?;
        ranked.push(RankedJunction { id, flow });
    }

    merge_sort_by(&mut ranked, |a, b| b.flow.cmp(&a.flow));
    Ok(ranked)
}
