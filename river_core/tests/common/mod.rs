#![allow(dead_code)]

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use river_core::{Coord, NetworkRules, RiverNetwork, VertexId, VertexKind};

/// Random river tree draining into vertex 1.
///
/// Vertex `i` flows into a random earlier vertex; vertices nobody flows into
/// become headwaters. A few road markers are linked onto the river as noise.
pub fn random_tree(seed: u64, river_vertices: u32, roads: u32) -> RiverNetwork {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut parent = vec![0u32; river_vertices as usize + 1];
    let mut has_upstream = vec![false; river_vertices as usize + 1];
    for id in 2..=river_vertices {
        let downstream = rng.gen_range(1..id);
        parent[id as usize] = downstream;
        has_upstream[downstream as usize] = true;
    }

    let mut network = RiverNetwork::new(NetworkRules::default());
    for id in 1..=river_vertices {
        let kind = if id == 1 {
            VertexKind::SeaEntrance
        } else if has_upstream[id as usize] {
            VertexKind::Junction
        } else {
            VertexKind::Headwater
        };
        network
            .add_vertex(VertexId(id), random_coord(&mut rng), kind)
            .unwrap();
    }
    for id in 2..=river_vertices {
        network
            .add_edge(VertexId(id), VertexId(parent[id as usize]))
            .unwrap();
    }
    for offset in 1..=roads {
        let id = VertexId(river_vertices + offset);
        network
            .add_vertex(id, random_coord(&mut rng), VertexKind::Road)
            .unwrap();
        let target = VertexId(rng.gen_range(1..=river_vertices));
        network.add_edge(id, target).unwrap();
    }
    network
}

pub fn random_coord(rng: &mut SmallRng) -> Coord {
    Coord::new(rng.gen_range(0..=650), rng.gen_range(0..=650))
}

pub fn rate(network: &RiverNetwork, source: u32, target: u32) -> Option<u32> {
    network
        .edge_between(VertexId(source), VertexId(target))
        .and_then(|edge| edge.flow_rate())
}
