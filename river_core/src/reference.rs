//! The compiled-in reference network.

use crate::distance::populate_distances;
use crate::flow::populate_flow_rate;
use crate::graph::{DuplicatePolicy, RiverNetwork};
use crate::loader::load_csv;
use crate::river_config::RiverConfig;

pub const BUILTIN_REFERENCE_NETWORK: &str = include_str!("data/reference_network.csv");

/// Reference network as loaded, before distances and flow are populated.
pub fn reference_network() -> RiverNetwork {
    load_csv(
        BUILTIN_REFERENCE_NETWORK.as_bytes(),
        &RiverConfig::builtin(),
        DuplicatePolicy::FailFast,
    )
    .expect("builtin reference network should load")
}

/// Reference network with distances and flow rates populated.
pub fn populated_reference_network() -> RiverNetwork {
    let mut network = reference_network();
    populate_distances(&mut network);
    populate_flow_rate(&mut network).expect("builtin reference network should be a river tree");
    network
}
