//! Unit tests for ntm-flow.

#[cfg(test)]
pub mod helpers {
    use crate::FdParameters;

    /// The reference calibration from the two-area scenario:
    /// acc = [25, 50], acc_jam = 100, free speed 50 km/h, road length 2 km.
    /// Derived capacity: 25 · 50 / 2 = 625 veh/h.
    pub fn reference_params() -> FdParameters {
        FdParameters::new([25.0, 50.0, 100.0], 50.0, 2.0).unwrap()
    }
}

#[cfg(test)]
mod params {
    use crate::{FdParameters, FlowError};

    #[test]
    fn derived_capacity_is_rising_branch_endpoint() {
        let p = super::helpers::reference_params();
        assert!((p.max_capacity_per_hour - 625.0).abs() < 1e-9);
    }

    #[test]
    fn thresholds_must_increase() {
        let err = FdParameters::new([50.0, 25.0, 100.0], 50.0, 2.0).unwrap_err();
        assert!(matches!(err, FlowError::NonIncreasingThresholds(_)));
        let err = FdParameters::new([25.0, 25.0, 100.0], 50.0, 2.0).unwrap_err();
        assert!(matches!(err, FlowError::NonIncreasingThresholds(_)));
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert!(FdParameters::new([25.0, 50.0, 100.0], 0.0, 2.0).is_err());
        assert!(FdParameters::new([25.0, 50.0, 100.0], 50.0, -1.0).is_err());
    }

    #[test]
    fn from_area_scales_per_km_defaults() {
        let p = FdParameters::from_area(50.0, 2.0);
        assert_eq!(p.acc_critical, [50.0, 100.0, 200.0]);
        // 25 veh/km · 50 km/h — road length cancels.
        assert!((p.max_capacity_per_hour - 1_250.0).abs() < 1e-9);
    }

    #[test]
    fn from_area_with_infinite_road_length_stays_finite_capacity() {
        let p = FdParameters::from_area(100.0, f64::INFINITY);
        assert!(p.max_capacity_per_hour.is_finite());
        assert!(p.acc_critical[2].is_infinite());
    }
}

#[cfg(test)]
mod diagram {
    use crate::{demand, production, supply};

    use super::helpers::reference_params;

    #[test]
    fn production_zero_at_empty_and_jam() {
        let p = reference_params();
        assert_eq!(production(0.0, &p), 0.0);
        assert_eq!(production(100.0, &p), 0.0);
        assert_eq!(production(250.0, &p), 0.0);
    }

    #[test]
    fn knots_evaluate_exactly() {
        let p = reference_params();
        assert_eq!(production(25.0, &p), 625.0);
        assert_eq!(production(50.0, &p), 625.0);
        assert_eq!(supply(50.0, &p), 625.0);
        assert_eq!(supply(100.0, &p), 0.0);
        assert_eq!(demand(25.0, &p), 625.0);
    }

    #[test]
    fn rising_branch_is_linear() {
        let p = reference_params();
        // Halfway up the rising branch.
        assert!((production(12.5, &p) - 312.5).abs() < 1e-9);
    }

    #[test]
    fn falling_branch_is_linear() {
        let p = reference_params();
        // Halfway down: n = 75 between acc₂ = 50 and jam = 100.
        assert!((supply(75.0, &p) - 312.5).abs() < 1e-9);
    }

    #[test]
    fn demand_is_non_decreasing_and_clamped() {
        let p = reference_params();
        let mut prev = 0.0;
        for i in 0..=300 {
            let d = demand(i as f64, &p);
            assert!(d >= prev - 1e-12, "demand decreased at n={i}");
            prev = d;
        }
        // Beyond jam the zone still *wants* to release at capacity.
        assert_eq!(demand(150.0, &p), 625.0);
    }

    #[test]
    fn supply_is_non_increasing() {
        let p = reference_params();
        let mut prev = f64::INFINITY;
        for i in 0..=300 {
            let s = supply(i as f64, &p);
            assert!(s <= prev + 1e-12, "supply increased at n={i}");
            prev = s;
        }
    }

    #[test]
    fn monotone_on_branch_intervals() {
        let p = reference_params();
        // Non-decreasing on [0, acc₁].
        let mut prev = -1.0;
        for i in 0..=25 {
            let v = production(i as f64, &p);
            assert!(v >= prev);
            prev = v;
        }
        // Non-increasing on [acc₂, acc_jam].
        let mut prev = f64::INFINITY;
        for i in 50..=100 {
            let v = production(i as f64, &p);
            assert!(v <= prev);
            prev = v;
        }
    }

    #[test]
    fn negative_input_clamps_to_zero() {
        let p = reference_params();
        assert_eq!(demand(-3.0, &p), 0.0);
        assert_eq!(supply(-3.0, &p), p.max_capacity_per_hour);
        assert_eq!(production(-3.0, &p), 0.0);
    }
}

#[cfg(test)]
mod behaviour {
    use ntm_core::NodeId;

    use crate::{BehaviourKind, CellBehaviour, UNRESTRAINED_CAPACITY};

    use super::helpers::reference_params;

    #[test]
    fn ntm_evaluate_uses_the_diagram() {
        let mut cb = CellBehaviour::new(BehaviourKind::Ntm(reference_params()));
        cb.state.accumulated_cars = 30.0;
        cb.evaluate(10.0 / 3_600.0);
        // n = 30 is on the flat top.
        assert!((cb.state.demand - 625.0).abs() < 1e-9);
        assert!((cb.state.supply - 625.0).abs() < 1e-9);
    }

    #[test]
    fn cordon_releases_everything_and_never_blocks() {
        let mut cb = CellBehaviour::new(BehaviourKind::Cordon);
        cb.state.accumulated_cars = 12.0;
        let dt_h = 10.0 / 3_600.0;
        cb.evaluate(dt_h);
        assert!((cb.state.demand * dt_h - 12.0).abs() < 1e-9);
        assert!(cb.state.supply.is_infinite());
    }

    #[test]
    fn border_capacity_default() {
        let cb = CellBehaviour::new(BehaviourKind::Road);
        assert_eq!(cb.state.border_capacity_to(NodeId(3)), UNRESTRAINED_CAPACITY);
    }

    #[test]
    fn start_tick_clears_transients_keeps_accumulation() {
        let mut cb = CellBehaviour::new(BehaviourKind::Ntm(reference_params()));
        cb.state.accumulated_cars = 8.0;
        cb.state.demand = 99.0;
        cb.state.demand_to_enter = 5.0;
        cb.state.by_destination.entry(NodeId(1)).or_default().demand_to_enter = 4.0;
        cb.state.by_destination.entry(NodeId(1)).or_default().accumulated = 8.0;

        cb.state.start_tick();

        assert_eq!(cb.state.accumulated_cars, 8.0);
        assert_eq!(cb.state.demand, 0.0);
        assert_eq!(cb.state.demand_to_enter, 0.0);
        let load = cb.state.by_destination[&NodeId(1)];
        assert_eq!(load.demand_to_enter, 0.0);
        assert_eq!(load.accumulated, 8.0);
    }

    #[test]
    fn speed_interpolates_towards_jam() {
        let mut cb = CellBehaviour::new(BehaviourKind::Ntm(reference_params()));
        cb.state.accumulated_cars = 0.0;
        assert_eq!(cb.current_speed_kmh(), Some(50.0));
        cb.state.accumulated_cars = 100.0; // jam
        assert_eq!(cb.current_speed_kmh(), Some(0.0));
    }
}
