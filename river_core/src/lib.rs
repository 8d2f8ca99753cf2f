//! River network model for the reference basin.
//!
//! Loads a river network, computes edge lengths and accumulated headwater flow,
//! and answers queries over it: junction ranking inside a region, dam what-if
//! reports and estimation of contamination sources from downstream readings.

mod contamination;
mod dam;
mod distance;
mod flow;
mod graph;
mod kind;
mod loader;
mod reference;
mod region;
mod river_config;
mod traversal;

pub use contamination::{
    chemical_source, Confidence, Observation, SourceAttribution, SourceLocator,
    DEFAULT_SEEPAGE_WINDOW,
};
pub use dam::{nearest_junction, simulate_dam, DamError, DamReport, DownstreamFlow};
pub use distance::{distance, populate_distances, squared_distance};
pub use flow::{populate_flow_rate, FlowError, FlowSummary, TopologyFault};
pub use graph::{
    Coord, DuplicatePolicy, Edge, EdgeIndex, GraphError, InsertOutcome, NetworkRules,
    RiverNetwork, Vertex, VertexId,
};
pub use kind::{RiverKinds, VertexKind};
pub use loader::{build_network, load_csv, load_csv_file, LoadError, NetworkRecord};
pub use reference::{populated_reference_network, reference_network, BUILTIN_REFERENCE_NETWORK};
pub use region::{
    merge_sort_by, rank_junctions_by_flow, vertices_in_region, RankedJunction, Region,
    RegionError,
};
pub use river_config::{
    load_river_config_from_env, MapExtent, RiverConfig, RiverConfigError, RiverConfigMetadata,
    BUILTIN_RIVER_CONFIG,
};
pub use traversal::{downstream_path, TraversalError};
