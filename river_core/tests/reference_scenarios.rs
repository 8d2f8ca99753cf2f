mod common;

use std::collections::BTreeSet;

use river_core::{
    chemical_source, populate_flow_rate, populated_reference_network, rank_junctions_by_flow,
    reference_network, simulate_dam, Confidence, Coord, MapExtent, Observation, Region,
    RiverNetwork, SourceLocator, VertexId, DEFAULT_SEEPAGE_WINDOW,
};

use common::rate;

fn ids(values: &[u32]) -> BTreeSet<VertexId> {
    values.iter().copied().map(VertexId).collect()
}

fn observations(readings: &[(u32, f64)]) -> Vec<Observation> {
    readings.iter().copied().map(Observation::from).collect()
}

fn render_ranking(network: &RiverNetwork, region: &Region) -> String {
    rank_junctions_by_flow(network, region)
        .unwrap()
        .iter()
        .map(|ranked| format!("{}:{}", ranked.id, ranked.flow))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn main_stem_accumulates_all_headwaters() {
    let network = populated_reference_network();
    assert_eq!(rate(&network, 33, 42), Some(29));
    assert_eq!(rate(&network, 42, 1), Some(30));
    assert_eq!(rate(&network, 46, 49), Some(11));
    assert_eq!(rate(&network, 39, 37), Some(22));
    assert_eq!(rate(&network, 19, 2), Some(1));
    assert_eq!(rate(&network, 50, 33), None);
    assert_eq!(rate(&network, 60, 35), None);
}

#[test]
fn every_river_vertex_is_visited() {
    let mut network = reference_network();
    let summary = populate_flow_rate(&mut network).unwrap();
    assert_eq!(summary.headwaters, 30);
    assert_eq!(summary.processed, 59);
    assert_eq!(summary.outlet_flow, Some(30));
    assert_eq!(summary.inflow_at(VertexId(33)), 29);
}

#[test]
fn ranks_junctions_in_north_west_quadrant() {
    let network = populated_reference_network();
    let region =
        Region::new(Coord::new(0, 0), Coord::new(300, 300), &MapExtent::default()).unwrap();
    insta::assert_snapshot!(
        render_ranking(&network, &region),
        @"42:30 33:29 34:28 59:27 35:26 2:25 36:24 37:23"
    );
}

#[test]
fn ranks_every_junction_on_the_map() {
    let network = populated_reference_network();
    let region = Region::from_corners(Coord::new(0, 0), Coord::new(650, 650));
    let order: Vec<u32> = rank_junctions_by_flow(&network, &region)
        .unwrap()
        .iter()
        .map(|ranked| ranked.id.0)
        .collect();
    assert_eq!(
        order,
        vec![
            42, 33, 34, 59, 35, 2, 36, 37, 39, 38, 49, 46, 50, 45, 55, 41, 47, 52, 56, 44, 53, 40,
            43, 48, 51, 54, 57, 58,
        ]
    );
}

#[test]
fn damming_near_the_main_stem() {
    let network = populated_reference_network();
    let report = simulate_dam(&network, Coord::new(210, 170)).unwrap();
    let mut lines = vec![format!(
        "junction {} dammed toward {}, removed {}",
        report.junction, report.dammed_target, report.removed
    )];
    lines.extend(report.downstream.iter().map(|step| {
        format!("{} -> {}: {} -> {}", step.from, step.to, step.original, step.adjusted)
    }));
    insta::assert_snapshot!(lines.join("\n"), @r"
    junction 2 dammed toward 35, removed 25
    35 -> 59: 26 -> 1
    59 -> 34: 27 -> 2
    34 -> 33: 28 -> 3
    33 -> 42: 29 -> 4
    42 -> 1: 30 -> 5
    ");
    assert_eq!(rate(&network, 2, 35), Some(25));
}

#[test]
fn split_readings_point_to_single_headwater() {
    let network = populated_reference_network();
    let readings = observations(&[(58, 3.0), (55, 10.0), (52, 5.0)]);
    let attribution = SourceLocator::new(&network, DEFAULT_SEEPAGE_WINDOW).locate(&readings);
    assert!(attribution.confirmed.is_empty());
    assert_eq!(attribution.resolved, Some(VertexId(25)));
    assert_eq!(chemical_source(&network, &readings), ids(&[25]));
}

#[test]
fn diluting_run_confirms_both_feeders() {
    let network = populated_reference_network();
    let readings = observations(&[(57, 10.0), (56, 5.0), (55, 2.0)]);
    let attribution = SourceLocator::new(&network, DEFAULT_SEEPAGE_WINDOW).locate(&readings);
    assert_eq!(attribution.confirmed.get(&VertexId(21)), Some(&Confidence::Diluting));
    assert_eq!(attribution.confirmed.get(&VertexId(22)), Some(&Confidence::Diluting));
    assert_eq!(attribution.sources(), ids(&[21, 22]));
}

#[test]
fn further_source_queries() {
    let network = populated_reference_network();
    assert_eq!(chemical_source(&network, &observations(&[(57, 4.0)])), ids(&[21, 22]));
    assert_eq!(
        chemical_source(&network, &observations(&[(40, 3.0), (41, 2.0)])),
        ids(&[6, 7])
    );
    assert_eq!(
        chemical_source(&network, &observations(&[(50, 9.0), (46, 4.0), (45, 1.0)])),
        ids(&[27])
    );
    assert!(chemical_source(&network, &[]).is_empty());
}

#[test]
fn pooled_candidates_are_scored_against_every_reading() {
    let network = populated_reference_network();
    assert_eq!(
        chemical_source(&network, &observations(&[(59, 1.0), (55, 1.0), (49, 1.0), (50, 1.0)])),
        ids(&[27])
    );
    assert_eq!(
        chemical_source(&network, &observations(&[(41, 1.0), (35, 1.0), (40, 1.0), (42, 1.0)])),
        ids(&[16])
    );
}

#[test]
fn readings_along_a_whole_main_stem() {
    let network = populated_reference_network();
    let locator = SourceLocator::new(&network, DEFAULT_SEEPAGE_WINDOW);
    let path = locator.headwater_path(VertexId(27)).unwrap();
    let readings: Vec<Observation> = path[1..]
        .iter()
        .enumerate()
        .map(|(step, &vertex)| Observation::new(vertex, 100.0 - step as f64))
        .collect();
    assert_eq!(readings.len(), 15);

    let attribution = locator.locate(&readings);
    assert_eq!(attribution.confirmed.get(&VertexId(27)), Some(&Confidence::Diluting));
    assert_eq!(attribution.confirmed.get(&VertexId(28)), Some(&Confidence::Diluting));
    assert_eq!(attribution.resolved, Some(VertexId(17)));
}

#[test]
fn repeated_reading_still_confirms_feeders() {
    let network = populated_reference_network();
    assert_eq!(
        chemical_source(&network, &observations(&[(57, 10.0), (57, 5.0)])),
        ids(&[21, 22])
    );
}

#[test]
fn queries_leave_stored_flow_untouched() {
    let network = populated_reference_network();
    let before: Vec<_> = network.edges().iter().map(|edge| edge.flow_rate()).collect();
    simulate_dam(&network, Coord::new(210, 170)).unwrap();
    chemical_source(&network, &observations(&[(58, 3.0), (55, 10.0), (52, 5.0)]));
    let after: Vec<_> = network.edges().iter().map(|edge| edge.flow_rate()).collect();
    assert_eq!(before, after);
}

#[test]
fn reference_results_are_deterministic() {
    let first = populated_reference_network();
    let second = populated_reference_network();
    let rates = |network: &RiverNetwork| -> Vec<Option<u32>> {
        network.edges().iter().map(|edge| edge.flow_rate()).collect()
    };
    assert_eq!(rates(&first), rates(&second));
    let everything = Region::from_corners(Coord::new(0, 0), Coord::new(650, 650));
    assert_eq!(render_ranking(&first, &everything), render_ranking(&second, &everything));
}
