//! Unit tests for ntm-output.

#[cfg(test)]
mod csv_backend {
    use tempfile::tempdir;

    use crate::row::{FlowCellRow, TickSummaryRow, ZoneSnapshotRow};
    use crate::writer::OutputWriter;
    use crate::CsvWriter;

    fn zone_row(tick: u64, code: &str, n: f64) -> ZoneSnapshotRow {
        ZoneSnapshotRow {
            tick,
            code: code.into(),
            behaviour: "ntm",
            accumulated_cars: n,
            demand: 625.0,
            supply: 625.0,
            speed_kmh: Some(42.0),
        }
    }

    #[test]
    fn files_created_with_headers() {
        let dir = tempdir().unwrap();
        let mut writer = CsvWriter::new(dir.path()).unwrap();
        writer.finish().unwrap();

        let snapshots = std::fs::read_to_string(dir.path().join("zone_snapshots.csv")).unwrap();
        assert!(snapshots.starts_with("tick,code,behaviour,accumulated_cars,demand,supply,speed_kmh"));
        let summaries = std::fs::read_to_string(dir.path().join("tick_summaries.csv")).unwrap();
        assert!(summaries.starts_with("tick,unix_time_secs,injected"));
        assert!(dir.path().join("flow_cells.csv").exists());
    }

    #[test]
    fn rows_round_trip() {
        let dir = tempdir().unwrap();
        let mut writer = CsvWriter::new(dir.path()).unwrap();

        writer
            .write_snapshots(&[zone_row(0, "Z01", 30.0), zone_row(0, "flow:17", 2.5)])
            .unwrap();
        writer
            .write_flow_cells(&[FlowCellRow {
                tick: 0,
                link_code: "hw1".into(),
                cell_index: 2,
                accumulated_cars: 4.25,
            }])
            .unwrap();
        writer
            .write_tick_summary(&TickSummaryRow {
                tick: 0,
                unix_time_secs: 1_000,
                injected: 30.0,
                departed: 1.5,
                arrived: 1.5,
                completed: 0.5,
                total_accumulation: 28.5,
                skipped_nodes: 0,
            })
            .unwrap();
        writer.finish().unwrap();

        let snapshots = std::fs::read_to_string(dir.path().join("zone_snapshots.csv")).unwrap();
        assert_eq!(snapshots.lines().count(), 3);
        assert!(snapshots.contains("Z01"));
        assert!(snapshots.contains("42"));

        let cells = std::fs::read_to_string(dir.path().join("flow_cells.csv")).unwrap();
        assert!(cells.contains("hw1,2,4.25"));

        let summaries = std::fs::read_to_string(dir.path().join("tick_summaries.csv")).unwrap();
        assert!(summaries.contains("0,1000,30"));
    }

    #[test]
    fn missing_speed_writes_empty_field() {
        let dir = tempdir().unwrap();
        let mut writer = CsvWriter::new(dir.path()).unwrap();
        let mut row = zone_row(3, "flow:9", 1.0);
        row.speed_kmh = None;
        row.supply = f64::INFINITY;
        writer.write_snapshots(&[row]).unwrap();
        writer.finish().unwrap();

        let snapshots = std::fs::read_to_string(dir.path().join("zone_snapshots.csv")).unwrap();
        let data_line = snapshots.lines().nth(1).unwrap();
        assert!(data_line.ends_with(','), "speed field should be empty: {data_line}");
        assert!(data_line.contains("inf"));
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut writer = CsvWriter::new(dir.path()).unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();
    }
}

#[cfg(test)]
mod observer {
    use tempfile::tempdir;

    use ntm_core::{NodeId, NtmSettings, Tick};
    use ntm_sim::{NodeSnapshot, SimObserver, TickSummary};
    use ntm_graph::TrafficBehaviourType;

    use crate::{CsvWriter, SimOutputObserver};

    #[test]
    fn bridges_summaries_and_snapshots_to_the_writer() {
        let dir = tempdir().unwrap();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let settings = NtmSettings { start_unix_secs: 100, ..NtmSettings::default() };
        let mut observer = SimOutputObserver::new(writer, &settings);

        let summary = TickSummary {
            tick: Tick(2),
            injected: 10.0,
            departed: 4.0,
            arrived: 4.0,
            completed: 1.0,
            total_accumulation: 9.0,
            skipped: vec![],
        };
        observer.on_tick_end(&summary);

        let nodes = vec![NodeSnapshot {
            tick: Tick(2),
            node: NodeId(0),
            code: "Z01".into(),
            behaviour: TrafficBehaviourType::Ntm,
            accumulated_cars: 9.0,
            demand: 225.0,
            supply: 625.0,
            speed_kmh: Some(50.0),
        }];
        observer.on_snapshot(&nodes, &[]);
        observer.on_sim_end(Tick(3));
        assert!(observer.take_error().is_none());

        let summaries = std::fs::read_to_string(dir.path().join("tick_summaries.csv")).unwrap();
        // Tick 2 at 10 s/tick starting at unix 100 → 120.
        assert!(summaries.contains("2,120,10"));
        let snapshots = std::fs::read_to_string(dir.path().join("zone_snapshots.csv")).unwrap();
        assert!(snapshots.contains("Z01"));
    }
}
