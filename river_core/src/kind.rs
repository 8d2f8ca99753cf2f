use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag attached to every vertex of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    Headwater,
    Junction,
    SeaEntrance,
    FlowGauge,
    /// Named stretch of river ("Katherine", "Daley River").
    Waterway,
    Road,
    Settlement,
    Other,
}

impl VertexKind {
    pub const ALL: [VertexKind; 8] = [
        VertexKind::Headwater,
        VertexKind::Junction,
        VertexKind::SeaEntrance,
        VertexKind::FlowGauge,
        VertexKind::Waterway,
        VertexKind::Road,
        VertexKind::Settlement,
        VertexKind::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            VertexKind::Headwater => "headwater",
            VertexKind::Junction => "junction",
            VertexKind::SeaEntrance => "sea_entrance",
            VertexKind::FlowGauge => "flow_gauge",
            VertexKind::Waterway => "waterway",
            VertexKind::Road => "road",
            VertexKind::Settlement => "settlement",
            VertexKind::Other => "other",
        }
    }

    pub const fn flag(&self) -> RiverKinds {
        match self {
            VertexKind::Headwater => RiverKinds::HEADWATER,
            VertexKind::Junction => RiverKinds::JUNCTION,
            VertexKind::SeaEntrance => RiverKinds::SEA_ENTRANCE,
            VertexKind::FlowGauge => RiverKinds::FLOW_GAUGE,
            VertexKind::Waterway => RiverKinds::WATERWAY,
            VertexKind::Road => RiverKinds::ROAD,
            VertexKind::Settlement => RiverKinds::SETTLEMENT,
            VertexKind::Other => RiverKinds::OTHER,
        }
    }
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags::bitflags! {
    /// Set of vertex kinds that take part in river flow.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RiverKinds: u8 {
        const HEADWATER = 1 << 0;
        const JUNCTION = 1 << 1;
        const SEA_ENTRANCE = 1 << 2;
        const FLOW_GAUGE = 1 << 3;
        const WATERWAY = 1 << 4;
        const ROAD = 1 << 5;
        const SETTLEMENT = 1 << 6;
        const OTHER = 1 << 7;
    }
}

impl RiverKinds {
    pub fn river_default() -> Self {
        RiverKinds::HEADWATER
            | RiverKinds::JUNCTION
            | RiverKinds::SEA_ENTRANCE
            | RiverKinds::FLOW_GAUGE
            | RiverKinds::WATERWAY
    }

    pub fn includes(&self, kind: VertexKind) -> bool {
        self.contains(kind.flag())
    }

    pub fn from_kinds<'a>(kinds: impl IntoIterator<Item = &'a VertexKind>) -> Self {
        kinds.into_iter().map(VertexKind::flag).collect()
    }
}

impl Default for RiverKinds {
    fn default() -> Self {
        Self::river_default()
    }
}
