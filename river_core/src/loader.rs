//! CSV network loader.
//!
//! Rows use the `Node,x,y,type,linked` layout. `linked` names the downstream
//! neighbour, `0` meaning none. A vertex with several links is written as several
//! rows with identical id, coordinates and type.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::graph::{
    Coord, DuplicatePolicy, GraphError, InsertOutcome, NetworkRules, RiverNetwork, VertexId,
};
use crate::river_config::RiverConfig;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkRecord {
    #[serde(rename = "Node")]
    pub vertex_id: u32,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub label: String,
    #[serde(rename = "linked", default)]
    pub downstream: u32,
}

impl NetworkRecord {
    fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    fn link(&self) -> Option<(VertexId, VertexId)> {
        (self.downstream != 0).then(|| (VertexId(self.vertex_id), VertexId(self.downstream)))
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read network from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed network record: {0}")]
    Csv(#[from] csv::Error),
    #[error("vertex {vertex} lies outside the map at {coord}")]
    CoordinateOutOfRange { vertex: VertexId, coord: Coord },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub fn load_csv<R: Read>(
    reader: R,
    config: &RiverConfig,
    policy: DuplicatePolicy,
) -> Result<RiverNetwork, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = rdr
        .deserialize::<NetworkRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    build_network(&records, config, policy)
}

pub fn load_csv_file(
    path: &Path,
    config: &RiverConfig,
    policy: DuplicatePolicy,
) -> Result<RiverNetwork, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let network = load_csv(file, config, policy)?;
    tracing::info!(
        target: "river_core::loader",
        path = %path.display(),
        vertices = network.len(),
        edges = network.edges().len(),
        "network.loaded=file"
    );
    Ok(network)
}

/// Vertices are inserted first, then links, so a row may name a vertex defined later.
pub fn build_network(
    records: &[NetworkRecord],
    config: &RiverConfig,
    policy: DuplicatePolicy,
) -> Result<RiverNetwork, LoadError> {
    let rules: NetworkRules = config.network_rules();
    let mut network = RiverNetwork::new(rules);
    let mut first_seen: HashMap<u32, &NetworkRecord> = HashMap::new();
    let mut links = Vec::new();

    for record in records {
        let vertex = VertexId(record.vertex_id);
        let coord = record.coord();
        if !config.map_extent.contains(coord) {
            return Err(LoadError::CoordinateOutOfRange { vertex, coord });
        }

        if let Some(existing) = first_seen.get(&record.vertex_id) {
            let continuation = existing.coord() == coord && existing.label == record.label;
            if !continuation {
                network.add_vertex_with(
                    policy,
                    vertex,
                    coord,
                    config.kind_for_label(&record.label),
                    record.label.as_str(),
                )?;
                continue;
            }
        } else {
            let kind = config.kind_for_label(&record.label);
            if network.add_vertex_with(policy, vertex, coord, kind, record.label.as_str())?
                == InsertOutcome::Inserted
            {
                first_seen.insert(record.vertex_id, record);
            }
        }
        links.extend(record.link());
    }

    for (source, target) in links {
        if !network.has_edge(source, target) {
            network.add_edge(source, target)?;
        }
    }

    tracing::debug!(
        target: "river_core::loader",
        records = records.len(),
        vertices = network.len(),
        edges = network.edges().len(),
        "network.built"
    );
    Ok(network)
}
