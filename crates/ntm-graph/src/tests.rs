//! Unit tests for ntm-graph.
//!
//! Fixtures are tiny hand-built networks over unit-square zones in a fake
//! projected plane (metres); speeds in km/h, lengths in km.

#[cfg(test)]
pub mod helpers {
    use geo::{LineString, Polygon};

    use ntm_core::{AreaId, Point2};
    use ntm_geo::Area;

    use crate::link::{LinkRecord, NodeRecord, TrafficBehaviourType};

    pub fn square(id: u32, x: f64, y: f64, size: f64) -> Area {
        let ring = LineString::from(vec![
            (x, y),
            (x + size, y),
            (x + size, y + size),
            (x, y + size),
            (x, y),
        ]);
        let mut area =
            Area::new(AreaId(id), format!("Z{id}"), format!("zone {id}"), Polygon::new(ring, vec![]));
        area.road_length_km = 2.0;
        area.avg_speed_kmh = 50.0;
        area
    }

    pub fn node(code: &str, x: f64, y: f64) -> NodeRecord {
        NodeRecord { code: code.into(), point: Point2::new(x, y) }
    }

    pub fn road(code: &str, from: &str, to: &str) -> LinkRecord {
        LinkRecord {
            code: code.into(),
            from: from.into(),
            to: to.into(),
            length_km: 0.5,
            free_speed_kmh: 50.0,
            capacity_per_hour: 1500.0,
            lanes: 2.0,
            behaviour: TrafficBehaviourType::Road,
        }
    }
}

#[cfg(test)]
mod graph_arena {
    use ntm_core::Point2;

    use crate::graph::NtmGraph;
    use crate::link::{LinkEdge, TrafficBehaviourType};

    fn edge(from: ntm_core::NodeId, to: ntm_core::NodeId, weight: f64) -> LinkEdge {
        LinkEdge {
            code: format!("e{}-{}", from.index(), to.index()),
            from,
            to,
            length_km: weight,
            free_speed_kmh: 50.0,
            capacity_per_hour: 1000.0,
            behaviour: TrafficBehaviourType::Road,
            weight,
            cells: Vec::new(),
        }
    }

    #[test]
    fn duplicate_code_rejected() {
        let mut g = NtmGraph::new();
        g.add_node("n1", Point2::new(0.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        assert!(g.add_node("n1", Point2::new(1.0, 1.0), None, TrafficBehaviourType::Road).is_err());
    }

    #[test]
    fn out_edges_in_insertion_order() {
        let mut g = NtmGraph::new();
        let a = g.add_node("a", Point2::new(0.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let b = g.add_node("b", Point2::new(1.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let c = g.add_node("c", Point2::new(2.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let e1 = g.add_edge(edge(a, b, 1.0)).unwrap();
        let e2 = g.add_edge(edge(a, c, 2.0)).unwrap();
        assert_eq!(g.out_edges(a), &[e1, e2]);
        assert_eq!(g.out_degree(b), 0);
    }

    #[test]
    fn edge_between_finds_first_match() {
        let mut g = NtmGraph::new();
        let a = g.add_node("a", Point2::new(0.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let b = g.add_node("b", Point2::new(1.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let e = g.add_edge(edge(a, b, 1.0)).unwrap();
        assert_eq!(g.edge_between(a, b), Some(e));
        assert_eq!(g.edge_between(b, a), None);
    }
}

#[cfg(test)]
mod dijkstra {
    use ntm_core::Point2;

    use crate::graph::NtmGraph;
    use crate::link::{LinkEdge, TrafficBehaviourType};
    use crate::path::shortest_path;

    fn edge(from: ntm_core::NodeId, to: ntm_core::NodeId, weight: f64) -> LinkEdge {
        LinkEdge {
            code: format!("e{}-{}", from.index(), to.index()),
            from,
            to,
            length_km: weight,
            free_speed_kmh: 50.0,
            capacity_per_hour: 1000.0,
            behaviour: TrafficBehaviourType::Road,
            weight,
            cells: Vec::new(),
        }
    }

    /// a → b → c is cheaper than the direct a → c edge.
    #[test]
    fn picks_cheaper_two_hop_path() {
        let mut g = NtmGraph::new();
        let a = g.add_node("a", Point2::new(0.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let b = g.add_node("b", Point2::new(1.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let c = g.add_node("c", Point2::new(2.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let ab = g.add_edge(edge(a, b, 1.0)).unwrap();
        let bc = g.add_edge(edge(b, c, 1.0)).unwrap();
        g.add_edge(edge(a, c, 5.0)).unwrap();

        let route = shortest_path(&g, a, c).unwrap();
        assert_eq!(route.edges, vec![ab, bc]);
        assert!((route.total_weight - 2.0).abs() < 1e-12);
        assert_eq!(route.node_sequence(&g, a), vec![a, b, c]);
    }

    #[test]
    fn unreachable_is_an_error() {
        let mut g = NtmGraph::new();
        let a = g.add_node("a", Point2::new(0.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let b = g.add_node("b", Point2::new(1.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        g.add_edge(edge(b, a, 1.0)).unwrap(); // wrong direction only
        assert!(shortest_path(&g, a, b).is_err());
    }

    #[test]
    fn path_to_self_is_empty() {
        let mut g = NtmGraph::new();
        let a = g.add_node("a", Point2::new(0.0, 0.0), None, TrafficBehaviourType::Road).unwrap();
        let route = shortest_path(&g, a, a).unwrap();
        assert!(route.edges.is_empty());
        assert_eq!(route.total_weight, 0.0);
    }
}

#[cfg(test)]
mod flow_cells {
    use crate::link::{promote_flow_links, FlowCell, TrafficBehaviourType};

    use super::helpers::road;

    const DT_HOURS: f64 = 10.0 / 3600.0;

    #[test]
    fn cell_count_rounds_to_nearest() {
        // ℓ = 100 km/h * 10 s = 0.2778 km; L = 1.0 km → N = round(3.6) = 4.
        let cells = FlowCell::decompose(1.0, 100.0, 4000.0, DT_HOURS);
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn short_link_still_gets_one_cell() {
        let cells = FlowCell::decompose(0.01, 100.0, 4000.0, DT_HOURS);
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn discretization_error_within_one_cell() {
        for length in [0.05, 0.3, 1.0, 2.7, 13.4] {
            let cells = FlowCell::decompose(length, 120.0, 4500.0, DT_HOURS);
            let cell_length = 120.0 * DT_HOURS;
            let covered = cells.len() as f64 * cell_length;
            assert!(
                (covered - length).abs() <= cell_length + 1e-12,
                "length {length}: covered {covered}"
            );
        }
    }

    #[test]
    fn cells_inherit_parent_capacity() {
        let cells = FlowCell::decompose(2.0, 100.0, 4321.0, DT_HOURS);
        for cell in &cells {
            assert_eq!(cell.capacity_per_hour, 4321.0);
            assert_eq!(cell.params.max_capacity_per_hour, 4321.0);
        }
    }

    #[test]
    fn promotion_needs_both_thresholds() {
        let mut links = vec![road("slow", "a", "b"), road("fast", "b", "c"), road("thin", "c", "d")];
        links[1].free_speed_kmh = 100.0;
        links[1].capacity_per_hour = 4000.0;
        links[2].free_speed_kmh = 100.0; // fast but low capacity

        let promoted = promote_flow_links(&mut links, 80.0, 3000.0);
        assert_eq!(promoted, 1);
        assert_eq!(links[1].behaviour, TrafficBehaviourType::Flow);
        assert_eq!(links[0].behaviour, TrafficBehaviourType::Road);
        assert_eq!(links[2].behaviour, TrafficBehaviourType::Road);
    }
}

#[cfg(test)]
mod builder {
    use ntm_geo::find_touching;

    use crate::builder::{GraphBuilder, DETOUR_FACTOR};
    use crate::link::TrafficBehaviourType;

    use super::helpers::{node, road, square};

    const DT_HOURS: f64 = 10.0 / 3600.0;

    #[test]
    fn link_graph_has_endpoints_and_centroids() {
        let mut areas = vec![square(0, 0.0, 0.0, 100.0), square(1, 100.0, 0.0, 100.0)];
        find_touching(&mut areas);
        let nodes = vec![node("a", 50.0, 50.0), node("b", 150.0, 50.0)];
        let links = vec![road("ab", "a", "b"), road("ba", "b", "a")];

        let built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();
        // 2 endpoints + 2 centroids.
        assert_eq!(built.link_graph.node_count(), 4);
        // 2 raw links + 2 connector pairs (centroid <-> in-zone endpoint).
        assert_eq!(built.link_graph.edge_count(), 2 + 4);
        for &cid in &built.link_centroid {
            assert_eq!(built.link_graph.node(cid).behaviour, TrafficBehaviourType::Centroid);
        }
    }

    #[test]
    fn adjacent_zones_get_one_aggregate_edge() {
        let mut areas = vec![square(0, 0.0, 0.0, 100.0), square(1, 100.0, 0.0, 100.0)];
        find_touching(&mut areas);
        let nodes = vec![node("a", 50.0, 50.0), node("b", 150.0, 50.0)];
        // Two parallel links in the same direction: first one wins.
        let mut second = road("ab2", "a", "b");
        second.capacity_per_hour = 9000.0;
        let links = vec![road("ab", "a", "b"), second, road("ba", "b", "a")];

        let built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();
        let (ca, cb) = (built.area_centroid[0], built.area_centroid[1]);

        let forward = built.area_graph.edge_between(ca, cb).expect("aggregate edge A->B");
        let forward = built.area_graph.edge(forward);
        assert_eq!(forward.capacity_per_hour, 1500.0); // not 9000: first wins

        // Centroids are 100 m apart; detour factor applies.
        let expected_km = DETOUR_FACTOR * 0.1;
        assert!((forward.length_km - expected_km).abs() < 1e-9);
        // Both zones average 50 km/h, so the edge weight is d / 50.
        assert!((forward.weight - expected_km / 50.0).abs() < 1e-12);

        assert!(built.area_graph.edge_between(cb, ca).is_some());
    }

    #[test]
    fn non_adjacent_zones_get_no_aggregate_edge() {
        let mut areas = vec![square(0, 0.0, 0.0, 100.0), square(1, 300.0, 0.0, 100.0)];
        find_touching(&mut areas);
        let nodes = vec![node("a", 50.0, 50.0), node("b", 350.0, 50.0)];
        let links = vec![road("ab", "a", "b")];

        let built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();
        let (ca, cb) = (built.area_centroid[0], built.area_centroid[1]);
        assert!(built.area_graph.edge_between(ca, cb).is_none());
    }

    #[test]
    fn flow_link_keeps_cells_and_gets_connectors() {
        let mut areas = vec![square(0, 0.0, 0.0, 100.0)];
        find_touching(&mut areas);
        let nodes = vec![node("a", 50.0, 50.0), node("f1", 200.0, 50.0), node("f2", 2_000.0, 50.0)];
        let mut highway = road("hw", "f1", "f2");
        highway.behaviour = TrafficBehaviourType::Flow;
        highway.length_km = 1.8;
        highway.free_speed_kmh = 108.0; // ℓ = 0.3 km → 6 cells
        highway.capacity_per_hour = 4000.0;
        // Ramp from the zone onto the highway.
        let links = vec![road("ramp", "a", "f1"), highway];

        let built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();
        let g = &built.area_graph;

        let f1 = g.node_by_code("flow:f1").expect("flow vertex f1");
        let f2 = g.node_by_code("flow:f2").expect("flow vertex f2");
        let hw = g.edge_between(f1, f2).expect("flow edge");
        assert_eq!(g.edge(hw).cells.len(), 6);
        assert_eq!(g.node(f1).behaviour, TrafficBehaviourType::Flow);

        // The ramp stitches f1 to zone 0's centroid, both directions.
        let c0 = built.area_centroid[0];
        assert!(g.edge_between(f1, c0).is_some());
        assert!(g.edge_between(c0, f1).is_some());
    }

    #[test]
    fn cordon_link_adds_feeder_vertex() {
        let mut areas = vec![square(0, 0.0, 0.0, 100.0)];
        find_touching(&mut areas);
        let nodes = vec![node("a", 50.0, 50.0), node("gate", 500.0, 50.0)];
        let mut feeder = road("feed", "gate", "a");
        feeder.behaviour = TrafficBehaviourType::Cordon;
        let links = vec![feeder];

        let built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();
        let g = &built.area_graph;
        let gate = g.node_by_code("cordon:gate").expect("feeder vertex");
        assert_eq!(g.node(gate).behaviour, TrafficBehaviourType::Cordon);
        let c0 = built.area_centroid[0];
        assert!(g.edge_between(gate, c0).is_some());
        assert!(g.edge_between(c0, gate).is_some());
    }

    #[test]
    fn road_segments_carry_lanes_into_zone_accounting() {
        use ntm_geo::accumulate_road_lengths;

        use crate::builder::road_segments;

        let mut areas = vec![square(0, 0.0, 0.0, 200.0)];
        areas[0].road_length_km = 0.0;
        let nodes = vec![node("a", 50.0, 50.0), node("b", 150.0, 50.0)];
        let mut wide = road("ab", "a", "b");
        wide.lanes = 3.0;
        let links = vec![wide, road("dangling", "a", "missing")];

        let segments = road_segments(&nodes, &links);
        assert_eq!(segments.len(), 1); // the dangling link resolves to nothing
        assert_eq!(segments[0].lanes, 3.0);

        accumulate_road_lengths(&mut areas, &segments);
        // Fully contained 0.5 km link with 3 lanes: 1.5 lane-km.
        assert!((areas[0].road_length_km - 1.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_endpoint_is_skipped_not_fatal() {
        let mut areas = vec![square(0, 0.0, 0.0, 100.0)];
        find_touching(&mut areas);
        let nodes = vec![node("a", 50.0, 50.0)];
        let links = vec![road("dangling", "a", "missing")];

        let built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();
        // Only the centroid connectors survive.
        assert_eq!(
            built.link_graph.edges().filter(|e| e.code == "dangling").count(),
            0
        );
    }
}

#[cfg(test)]
mod repair {
    use ntm_geo::find_touching;

    use crate::builder::GraphBuilder;
    use crate::repair::connect_isolated_areas;

    use super::helpers::{node, road, square};

    const DT_HOURS: f64 = 10.0 / 3600.0;

    /// Zones A and B touch; zone C sits 300 m away with road access but no
    /// shared boundary.  After repair C must be tied into the area graph.
    #[test]
    fn isolated_zone_gains_synthesized_edge() {
        let mut areas = vec![
            square(0, 0.0, 0.0, 100.0),
            square(1, 100.0, 0.0, 100.0),
            square(2, 500.0, 0.0, 100.0),
        ];
        find_touching(&mut areas);
        assert!(areas[2].touching.is_empty());

        let nodes = vec![node("a", 50.0, 50.0), node("b", 150.0, 50.0), node("c", 550.0, 50.0)];
        let links = vec![
            road("ab", "a", "b"),
            road("ba", "b", "a"),
            road("bc", "b", "c"),
            road("cb", "c", "b"),
        ];
        let mut built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();

        let report = connect_isolated_areas(&mut areas, &mut built);
        assert_eq!(report.isolated_areas, 1);
        assert_eq!(report.repaired_areas, 1);
        assert!(report.synthesized_edges >= 1);

        // C now has at least one outgoing edge and a symmetric relation.
        let cc = built.area_centroid[2];
        assert!(built.area_graph.out_degree(cc) >= 1);
        let neighbour = *areas[2].touching.iter().next().expect("touching gained");
        assert!(areas[neighbour.index()].touching.contains(&areas[2].id));
    }

    /// Seven satellite diamonds whose envelopes overlap the central zone's
    /// own envelope (no boundary contact anywhere): no search radius can cut
    /// the candidate set to the target, so refinement must give up and the
    /// pass must still return.
    #[test]
    fn overlapping_envelopes_cannot_stall_the_repair_pass() {
        use geo::{LineString, Polygon};
        use ntm_core::AreaId;
        use ntm_geo::Area;

        fn diamond(id: u32, cx: f64, cy: f64, r: f64) -> Area {
            let ring = LineString::from(vec![
                (cx - r, cy),
                (cx, cy - r),
                (cx + r, cy),
                (cx, cy + r),
                (cx - r, cy),
            ]);
            let mut area = Area::new(
                AreaId(id),
                format!("Z{id}"),
                format!("zone {id}"),
                Polygon::new(ring, vec![]),
            );
            area.road_length_km = 2.0;
            area.avg_speed_kmh = 50.0;
            area
        }

        let mut areas = vec![diamond(0, 0.0, 0.0, 50.0)];
        let satellites = [
            (48.0, 48.0),
            (-48.0, 48.0),
            (48.0, -48.0),
            (-48.0, -48.0),
            (44.0, 52.0),
            (-44.0, -52.0),
            (52.0, -44.0),
        ];
        for (i, &(cx, cy)) in satellites.iter().enumerate() {
            areas.push(diamond(i as u32 + 1, cx, cy, 5.0));
        }
        find_touching(&mut areas);
        assert!(areas[0].touching.is_empty(), "central diamond must start isolated");

        let mut built = GraphBuilder::new(&areas, &[], &[]).build(DT_HOURS).unwrap();
        let report = connect_isolated_areas(&mut areas, &mut built);

        // No roads exist, so nothing can actually be reconnected — but the
        // pass has to finish and say so.
        assert_eq!(report.repaired_areas, 0);
        assert!(areas[0].touching.is_empty());
    }

    #[test]
    fn unreachable_zone_stays_isolated_without_panicking() {
        let mut areas = vec![
            square(0, 0.0, 0.0, 100.0),
            square(1, 100.0, 0.0, 100.0),
            square(2, 500.0, 0.0, 100.0), // no road to it at all
        ];
        find_touching(&mut areas);
        let nodes = vec![node("a", 50.0, 50.0), node("b", 150.0, 50.0), node("c", 550.0, 50.0)];
        let links = vec![road("ab", "a", "b"), road("ba", "b", "a")];
        let mut built = GraphBuilder::new(&areas, &nodes, &links).build(DT_HOURS).unwrap();

        let report = connect_isolated_areas(&mut areas, &mut built);
        assert_eq!(report.isolated_areas, 1);
        assert_eq!(report.repaired_areas, 0);
        assert!(areas[2].touching.is_empty());
    }
}
