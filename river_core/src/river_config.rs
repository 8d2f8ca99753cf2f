//! Configuration for river classification and query heuristics.
//!
//! Loaded from `river_config.json` with support for an environment variable override.

use std::{
    collections::BTreeMap,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;

use crate::graph::{Coord, NetworkRules, VertexId};
use crate::kind::{RiverKinds, VertexKind};

pub const BUILTIN_RIVER_CONFIG: &str = include_str!("data/river_config.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    pub outlet_id: u32,
    pub source_flow: u32,
    pub river_kinds: Vec<VertexKind>,
    /// Raw loader labels mapped to vertex kinds.
    pub type_labels: BTreeMap<String, VertexKind>,
    pub non_river_blacklist: Vec<(u32, u32)>,
    pub map_extent: MapExtent,
    /// Half-width of the square searched for a seeping headwater.
    pub seepage_window: i32,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            outlet_id: 1,
            source_flow: 1,
            river_kinds: vec![
                VertexKind::Headwater,
                VertexKind::Junction,
                VertexKind::SeaEntrance,
                VertexKind::FlowGauge,
                VertexKind::Waterway,
            ],
            type_labels: default_type_labels(),
            non_river_blacklist: Vec::new(),
            map_extent: MapExtent::default(),
            seepage_window: 50,
        }
    }
}

fn default_type_labels() -> BTreeMap<String, VertexKind> {
    VertexKind::ALL
        .iter()
        .map(|kind| (kind.as_str().to_string(), *kind))
        .collect()
}

impl RiverConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_RIVER_CONFIG).expect("builtin river config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, RiverConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| RiverConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = RiverConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Resolve a loader label, falling back to a case-insensitive match and then to
    /// [`VertexKind::Other`].
    pub fn kind_for_label(&self, label: &str) -> VertexKind {
        let label = label.trim();
        if let Some(kind) = self.type_labels.get(label) {
            return *kind;
        }
        self.type_labels
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(label))
            .map(|(_, kind)| *kind)
            .unwrap_or(VertexKind::Other)
    }

    pub fn network_rules(&self) -> NetworkRules {
        NetworkRules {
            river_kinds: RiverKinds::from_kinds(self.river_kinds.iter()),
            non_river_blacklist: self
                .non_river_blacklist
                .iter()
                .map(|&(source, target)| (VertexId(source), VertexId(target)))
                .collect(),
            outlet: VertexId(self.outlet_id),
            source_flow: self.source_flow,
        }
    }
}

/// Square map extent accepted by the coordinate validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapExtent {
    pub min: i32,
    pub max: i32,
}

impl Default for MapExtent {
    fn default() -> Self {
        Self { min: 0, max: 650 }
    }
}

impl MapExtent {
    pub fn contains(&self, coord: Coord) -> bool {
        (self.min..=self.max).contains(&coord.x) && (self.min..=self.max).contains(&coord.y)
    }
}

#[derive(Debug, Error)]
pub enum RiverConfigError {
    #[error("failed to parse river config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read river config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the active river configuration came from.
#[derive(Debug, Clone, Default)]
pub struct RiverConfigMetadata {
    path: Option<PathBuf>,
}

impl RiverConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load river configuration from `RIVER_CONFIG_PATH`, falling back to the builtin copy.
pub fn load_river_config_from_env() -> (Arc<RiverConfig>, RiverConfigMetadata) {
    if let Some(path) = env::var("RIVER_CONFIG_PATH").ok().map(PathBuf::from) {
        match RiverConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "river_core::config",
                    path = %path.display(),
                    "river_config.loaded=file"
                );
                return (Arc::new(config), RiverConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "river_core::config",
                    path = %path.display(),
                    error = %err,
                    "river_config.load_failed"
                );
            }
        }
    }

    let config = RiverConfig::builtin();
    tracing::info!(target: "river_core::config", "river_config.loaded=builtin");
    (config, RiverConfigMetadata::new(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses() {
        let config = RiverConfig::builtin();
        assert_eq!(config.outlet_id, 1);
        assert_eq!(config.seepage_window, 50);
        assert_eq!(config.non_river_blacklist, vec![(50, 33), (33, 50)]);
    }

    #[test]
    fn labels_resolve_to_kinds() {
        let config = RiverConfig::builtin();
        assert_eq!(config.kind_for_label("sea entrance"), VertexKind::SeaEntrance);
        assert_eq!(config.kind_for_label("Daley River"), VertexKind::Waterway);
        assert_eq!(config.kind_for_label("JUNCTION"), VertexKind::Junction);
        assert_eq!(config.kind_for_label("town"), VertexKind::Settlement);
        assert_eq!(config.kind_for_label("lighthouse"), VertexKind::Other);
    }

    #[test]
    fn rules_carry_blacklist_and_outlet() {
        let rules = RiverConfig::builtin().network_rules();
        assert_eq!(rules.outlet, VertexId(1));
        assert!(rules
            .non_river_blacklist
            .contains(&(VertexId(50), VertexId(33))));
        assert!(rules.river_kinds.includes(VertexKind::FlowGauge));
        assert!(!rules.river_kinds.includes(VertexKind::Road));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = RiverConfig::from_json_str(r#"{ "outlet_id": 7 }"#).unwrap();
        assert_eq!(config.outlet_id, 7);
        assert_eq!(config.source_flow, 1);
        assert_eq!(config.map_extent, MapExtent::default());
        assert_eq!(config.kind_for_label("headwater"), VertexKind::Headwater);
    }

    #[test]
    fn extent_is_inclusive() {
        let extent = MapExtent::default();
        assert!(extent.contains(Coord::new(0, 650)));
        assert!(!extent.contains(Coord::new(-1, 10)));
        assert!(!extent.contains(Coord::new(10, 651)));
    }
}
