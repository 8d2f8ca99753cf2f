use crate::graph::{Coord, RiverNetwork};

/// Straight-line distance between two map coordinates.
pub fn distance(a: Coord, b: Coord) -> f64 {
    let (dx, dy) = offset(a, b);
    let (dx, dy) = (dx as f64, dy as f64);
    (dx * dx + dy * dy).sqrt()
}

/// Saturates at `i64::MAX` for coordinates near the ends of the `i32` range.
pub fn squared_distance(a: Coord, b: Coord) -> i64 {
    let (dx, dy) = offset(a, b);
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}

fn offset(a: Coord, b: Coord) -> (i64, i64) {
    (i64::from(b.x) - i64::from(a.x), i64::from(b.y) - i64::from(a.y))
}

/// Set every edge weight to the distance between its endpoints.
///
/// Returns the number of edges visited. Running it again recomputes the same values.
pub fn populate_distances(network: &mut RiverNetwork) -> usize {
    let weights: Vec<f64> = network
        .edges()
        .iter()
        .map(|edge| {
            // add_edge guarantees both endpoints exist.
            let from = network.vertex(edge.source).map(|v| v.coord).unwrap_or_default();
            let to = network.vertex(edge.target).map(|v| v.coord).unwrap_or_default();
            distance(from, to)
        })
        .collect();

    let count = weights.len();
    for (edge, weight) in network.edges_mut().iter_mut().zip(weights) {
        edge.set_weight(weight);
    }
    tracing::debug!(target: "river_core::distance", edges = count, "distances.populated");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NetworkRules, VertexId};
    use crate::kind::VertexKind;

    #[test]
    fn pythagorean_triple() {
        assert_eq!(distance(Coord::new(0, 0), Coord::new(3, 4)), 5.0);
        assert_eq!(distance(Coord::new(3, 4), Coord::new(0, 0)), 5.0);
        assert_eq!(squared_distance(Coord::new(-2, 1), Coord::new(1, 5)), 25);
    }

    #[test]
    fn far_apart_points_saturate() {
        let low = Coord::new(i32::MIN, i32::MIN);
        let high = Coord::new(i32::MAX, i32::MAX);
        assert_eq!(squared_distance(low, high), i64::MAX);
        let expected = (u32::MAX as f64) * std::f64::consts::SQRT_2;
        assert!((distance(low, high) - expected).abs() < 1.0);
    }

    #[test]
    fn coincident_points_are_zero_apart() {
        assert_eq!(distance(Coord::new(380, 340), Coord::new(380, 340)), 0.0);
    }

    #[test]
    fn weights_are_set_once_per_edge() {
        let mut network = RiverNetwork::new(NetworkRules::default());
        network
            .add_vertex(VertexId(1), Coord::new(0, 0), VertexKind::SeaEntrance)
            .unwrap();
        network
            .add_vertex(VertexId(2), Coord::new(6, 8), VertexKind::Headwater)
            .unwrap();
        network
            .add_vertex(VertexId(3), Coord::new(0, 8), VertexKind::Road)
            .unwrap();
        network.add_edge(VertexId(2), VertexId(1)).unwrap();
        network.add_edge(VertexId(2), VertexId(3)).unwrap();

        assert!(network.edges().iter().all(|edge| edge.weight().is_none()));
        assert_eq!(populate_distances(&mut network), 2);
        let weights: Vec<_> = network.edges().iter().map(|e| e.weight()).collect();
        assert_eq!(weights, vec![Some(10.0), Some(6.0)]);

        populate_distances(&mut network);
        let again: Vec<_> = network.edges().iter().map(|e| e.weight()).collect();
        assert_eq!(weights, again);
    }
}
