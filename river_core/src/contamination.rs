//! Contamination source estimation from downstream concentration readings.
//!
//! Every headwater's path to the outlet is computed once. A reading set that lies
//! entirely on one headwater's path, as a consecutive run starting right below
//! the headwater, confirms that headwater. Readings split across several paths
//! are decomposed recursively; the candidates gathered that way are reduced to
//! the one with the smallest sum of squared distances to all of the readings.
//!
//! This is a heuristic estimator: an empty result means no plausible source.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::distance::squared_distance;
use crate::graph::{Coord, RiverNetwork, VertexId};
use crate::traversal::downstream_path;

pub const DEFAULT_SEEPAGE_WINDOW: i32 = 50;

/// Concentration measured at a vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub vertex: VertexId,
    pub concentration: f64,
}

impl Observation {
    pub const fn new(vertex: VertexId, concentration: f64) -> Self {
        Self {
            vertex,
            concentration,
        }
    }
}

impl From<(u32, f64)> for Observation {
    fn from((vertex, concentration): (u32, f64)) -> Self {
        Self::new(VertexId(vertex), concentration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// Readings form a consecutive run starting directly below the headwater.
    Adjacent,
    /// As `Adjacent`, and concentrations never rise going downstream.
    Diluting,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceAttribution {
    pub confirmed: BTreeMap<VertexId, Confidence>,
    /// Candidate kept after distance resolution of the pooled headwaters.
    pub resolved: Option<VertexId>,
}

impl SourceAttribution {
    pub fn sources(&self) -> BTreeSet<VertexId> {
        self.confirmed
            .keys()
            .copied()
            .chain(self.resolved)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty() && self.resolved.is_none()
    }
}

#[derive(Debug, Clone)]
struct HeadwaterPath {
    headwater: VertexId,
    coord: Coord,
    path: Vec<VertexId>,
    position: HashMap<VertexId, usize>,
}

impl HeadwaterPath {
    fn new(headwater: VertexId, coord: Coord, path: Vec<VertexId>) -> Self {
        let position = path
            .iter()
            .enumerate()
            .map(|(index, vertex)| (*vertex, index))
            .collect();
        Self {
            headwater,
            coord,
            path,
            position,
        }
    }

    fn feeds(&self, vertex: VertexId) -> bool {
        self.path.get(1) == Some(&vertex)
    }
}

/// Source estimator over a flow-populated network.
#[derive(Debug, Clone)]
pub struct SourceLocator<'a> {
    network: &'a RiverNetwork,
    paths: Vec<HeadwaterPath>,
    seepage_window: i32,
}

impl<'a> SourceLocator<'a> {
    pub fn new(network: &'a RiverNetwork, seepage_window: i32) -> Self {
        let paths = network
            .headwaters()
            .map(|headwater| {
                let path = match downstream_path(network, headwater.id) {
                    Ok(path) => path,
                    Err(err) => {
                        tracing::debug!(
                            target: "river_core::contamination",
                            headwater = %headwater.id,
                            error = %err,
                            "headwater_path.empty"
                        );
                        Vec::new()
                    }
                };
                HeadwaterPath::new(headwater.id, headwater.coord, path)
            })
            .collect();
        Self {
            network,
            paths,
            seepage_window,
        }
    }

    /// Cached path from `headwater` to the outlet; empty when the outlet is unreachable.
    pub fn headwater_path(&self, headwater: VertexId) -> Option<&[VertexId]> {
        self.paths
            .iter()
            .find(|entry| entry.headwater == headwater)
            .map(|entry| entry.path.as_slice())
    }

    /// Readings repeated at one vertex are collapsed to the first one.
    pub fn locate(&self, observations: &[Observation]) -> SourceAttribution {
        let readings = distinct_readings(observations);
        let mut inference = Inference {
            locator: self,
            readings: &readings,
            max_depth: readings.len(),
            memo: HashMap::new(),
        };
        let attribution = inference.infer(&readings, 0);
        tracing::info!(
            target: "river_core::contamination",
            observations = observations.len(),
            subsets = inference.memo.len(),
            confirmed = attribution.confirmed.len(),
            resolved = ?attribution.resolved,
            "sources.located"
        );
        attribution
    }

    /// Headwaters whose first downstream step is `vertex`.
    pub fn direct_tributaries(&self, vertex: VertexId) -> Vec<VertexId> {
        self.paths
            .iter()
            .filter(|entry| entry.feeds(vertex))
            .map(|entry| entry.headwater)
            .collect()
    }

    /// Nearest headwater inside the seepage window around `vertex`.
    pub fn seeping_headwater(&self, vertex: VertexId) -> Option<VertexId> {
        let center = self.network.vertex(vertex)?.coord;
        let window = self.seepage_window;
        let mut best: Option<(VertexId, i64)> = None;
        for entry in &self.paths {
            let dx = (i64::from(entry.coord.x) - i64::from(center.x)).abs();
            let dy = (i64::from(entry.coord.y) - i64::from(center.y)).abs();
            if dx > i64::from(window) || dy > i64::from(window) {
                continue;
            }
            let gap = squared_distance(entry.coord, center);
            if best.map_or(true, |(_, closest)| gap < closest) {
                best = Some((entry.headwater, gap));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Pooled candidate with the lowest sum of squared distances to `readings`.
    fn closest_candidate(&self, pool: &[VertexId], readings: &[Observation]) -> Option<VertexId> {
        let mut seen = HashSet::new();
        let mut best: Option<(VertexId, i64)> = None;
        for &candidate in pool {
            if !seen.insert(candidate) {
                continue;
            }
            let Some(origin) = self.network.vertex(candidate).map(|v| v.coord) else {
                continue;
            };
            let score = readings
                .iter()
                .filter_map(|obs| self.network.vertex(obs.vertex))
                .map(|observed| squared_distance(origin, observed.coord))
                .fold(0i64, i64::saturating_add);
            if best.map_or(true, |(_, lowest)| score < lowest) {
                best = Some((candidate, score));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// State of one `locate` call.
///
/// Subsets of the readings recur across headwaters that share a downstream path,
/// so each subset is solved once. Every subset is a strict subset of its parent,
/// which keeps the result independent of the depth it was first reached at.
struct Inference<'l, 'a> {
    locator: &'l SourceLocator<'a>,
    /// Full reading set; pooled candidates are scored against all of it.
    readings: &'l [Observation],
    max_depth: usize,
    memo: HashMap<Vec<VertexId>, SourceAttribution>,
}

impl Inference<'_, '_> {
    fn infer(&mut self, observations: &[Observation], depth: usize) -> SourceAttribution {
        if observations.is_empty() || depth > self.max_depth {
            return SourceAttribution::default();
        }
        let key: Vec<VertexId> = observations.iter().map(|obs| obs.vertex).collect();
        if let Some(known) = self.memo.get(&key) {
            return known.clone();
        }

        let locator = self.locator;
        let mut attribution = SourceAttribution::default();
        let mut pool = Vec::new();
        for entry in &locator.paths {
            let mut matched: Vec<(usize, Observation)> = observations
                .iter()
                .filter_map(|obs| entry.position.get(&obs.vertex).map(|&index| (index, *obs)))
                .collect();
            matched.sort_by_key(|(index, _)| *index);

            if matched.len() == observations.len() {
                if let Some(confidence) = confirm(&matched) {
                    attribution.confirmed.insert(entry.headwater, confidence);
                }
                continue;
            }
            if matched.len() < 2 {
                continue;
            }

            let (common, difference): (Vec<Observation>, Vec<Observation>) = observations
                .iter()
                .copied()
                .partition(|obs| entry.position.contains_key(&obs.vertex));

            if !is_consecutive(&matched) {
                for obs in &common {
                    pool.extend(locator.direct_tributaries(obs.vertex));
                }
            }
            pool.extend(self.infer(&common, depth + 1).sources());

            match difference.as_slice() {
                [] => {}
                [leftover] => {
                    let tributaries = locator.direct_tributaries(leftover.vertex);
                    if tributaries.is_empty() {
                        pool.extend(locator.seeping_headwater(leftover.vertex));
                    } else {
                        pool.extend(tributaries);
                    }
                }
                _ => pool.extend(self.infer(&difference, depth + 1).sources()),
            }
        }

        attribution.resolved = locator.closest_candidate(&pool, self.readings);
        tracing::debug!(
            target: "river_core::contamination",
            depth,
            observations = observations.len(),
            pooled = pool.len(),
            confirmed = attribution.confirmed.len(),
            "inference.level"
        );
        self.memo.insert(key, attribution.clone());
        attribution
    }
}

fn distinct_readings(observations: &[Observation]) -> Vec<Observation> {
    let mut seen = HashSet::new();
    observations
        .iter()
        .filter(|obs| {
            let first = seen.insert(obs.vertex);
            if !first {
                tracing::debug!(
                    target: "river_core::contamination",
                    vertex = %obs.vertex,
                    "observation.duplicate=ignored"
                );
            }
            first
        })
        .copied()
        .collect()
}

/// `matched` must be sorted by path index.
fn confirm(matched: &[(usize, Observation)]) -> Option<Confidence> {
    let first = matched.first()?;
    if first.0 != 1 || !is_consecutive(matched) {
        return None;
    }
    let diluting = matched
        .windows(2)
        .all(|pair| pair[0].1.concentration >= pair[1].1.concentration);
    Some(if diluting {
        Confidence::Diluting
    } else {
        Confidence::Adjacent
    })
}

fn is_consecutive(matched: &[(usize, Observation)]) -> bool {
    matched.windows(2).all(|pair| pair[1].0 == pair[0].0 + 1)
}

/// Most plausible headwater source(s) for `observations`.
pub fn chemical_source(
    network: &RiverNetwork,
    observations: &[Observation],
) -> BTreeSet<VertexId> {
    SourceLocator::new(network, DEFAULT_SEEPAGE_WINDOW)
        .locate(observations)
        .sources()
}
