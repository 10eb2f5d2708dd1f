//! Integration tests for ws-output.

use ws_core::{Day, Parameters, RandomStream, SimConfig, WardId};
use ws_infection::{Pool, SeedRecord};
use ws_network::WardNetworkBuilder;
use ws_sim::{DayRecord, Sim, SimBuilder};

use crate::row::{DaySummaryRow, StageTotalRow, WardSnapshotRow};

fn record(day: u32) -> DayRecord {
    DayRecord {
        day:            Day(day),
        stage_totals:   vec![2_980, 10, 5, 3, 2],
        new_infections: 4,
        seeded:         1,
        imported:       2,
        infected:       18,
    }
}

/// Three wards of 1000, one daily import, snapshots every other day.
fn small_sim(max_days: u32) -> Sim {
    let mut b = WardNetworkBuilder::new();
    for i in 0..3 {
        b.add_ward(1_000, Some((i as f64, 0.0)));
    }
    let network = b.build().unwrap();

    let mut params = Parameters::default();
    params.daily_imports = 1.0;

    let config = SimConfig { max_days, num_threads: Some(1), snapshot_interval_days: 2 };
    let mut rng = RandomStream::new(11);
    SimBuilder::new(params)
        .network(network)
        .initialise(&mut rng)
        .unwrap()
        .seeds(vec![SeedRecord::new(WardId(0), Day(0), 5)])
        .unwrap()
        .build(config, rng)
        .unwrap()
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod row_tests {
    use super::*;

    #[test]
    fn summary_from_record() {
        let row = DaySummaryRow::from_record(&record(3));
        assert_eq!(row, DaySummaryRow {
            day:            3,
            susceptible:    2_980,
            infected:       18,
            removed:        2,
            new_infections: 4,
            seeded:         1,
            imported:       2,
        });
    }

    #[test]
    fn one_total_per_stage() {
        let rows = StageTotalRow::from_record(&record(1));
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], StageTotalRow { day: 1, stage: 0, count: 2_980 });
        assert_eq!(rows[4], StageTotalRow { day: 1, stage: 4, count: 2 });
    }

    #[test]
    fn snapshot_skips_empty_buckets() {
        let sim = small_sim(1);
        let rows = WardSnapshotRow::collect(Day(0), sim.state());
        // Everybody is susceptible: one row per ward and pool.
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.stage == 0 && r.count == 500));
        assert_eq!(rows[1].pool, Pool::Play);
        assert_eq!(rows[2].ward, 1);
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::CsvWriter;
    use crate::observer::SimOutputObserver;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    fn rows(path: std::path::PathBuf) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join("day_summaries.csv")),
            ["day", "susceptible", "infected", "removed", "new_infections", "seeded", "imported"]
        );
        assert_eq!(headers(dir.path().join("stage_totals.csv")), ["day", "stage", "count"]);
        assert_eq!(
            headers(dir.path().join("ward_snapshots.csv")),
            ["day", "ward", "pool", "stage", "count"]
        );
    }

    #[test]
    fn csv_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_day_summary(&DaySummaryRow::from_record(&record(2))).unwrap();
        w.write_stage_totals(&StageTotalRow::from_record(&record(2))).unwrap();
        w.write_ward_snapshot(&[WardSnapshotRow { day: 2, ward: 7, pool: Pool::Play, stage: 3, count: 9 }])
            .unwrap();
        w.finish().unwrap();

        let summary = rows(dir.path().join("day_summaries.csv"));
        assert_eq!(summary.len(), 1);
        assert_eq!(&summary[0][0], "2");
        assert_eq!(&summary[0][2], "18");

        assert_eq!(rows(dir.path().join("stage_totals.csv")).len(), 5);

        let snapshot = rows(dir.path().join("ward_snapshots.csv"));
        assert_eq!(&snapshot[0][1], "7");
        assert_eq!(&snapshot[0][2], "play");
        assert_eq!(&snapshot[0][4], "9");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tmp();
        let missing = dir.path().join("absent");
        match CsvWriter::new(&missing) {
            Err(crate::OutputError::MissingDirectory(path)) => assert_eq!(path, missing),
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("writer opened in a missing directory"),
        }
        assert!(!missing.exists());
    }

    #[test]
    fn integration_csv() {
        let mut sim = small_sim(5);

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer);
        let summary = sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(summary.days_run, 5);

        assert_eq!(rows(dir.path().join("day_summaries.csv")).len(), 5);
        // ncov: susceptible, four disease stages.
        assert_eq!(rows(dir.path().join("stage_totals.csv")).len(), 5 * 5);

        // Snapshots on days 0, 2 and 4, at least one row per ward and pool.
        let snapshots = rows(dir.path().join("ward_snapshots.csv"));
        let days: std::collections::BTreeSet<_> = snapshots.iter().map(|r| r[0].to_owned()).collect();
        assert_eq!(days.into_iter().collect::<Vec<_>>(), ["0", "2", "4"]);
        assert!(snapshots.len() >= 3 * 6);
        let total: u64 = snapshots
            .iter()
            .filter(|r| &r[0] == "4")
            .map(|r| r[4].parse::<u64>().unwrap())
            .sum();
        assert_eq!(total, 3_000);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;
    use crate::observer::SimOutputObserver;
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

    /// Fails every summary write; counts everything else.
    #[derive(Default)]
    struct FlakyWriter {
        totals:   usize,
        finished: usize,
    }

    impl OutputWriter for FlakyWriter {
        fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other(format!("day {}", row.day))))
        }
        fn write_stage_totals(&mut self, rows: &[StageTotalRow]) -> OutputResult<()> {
            self.totals += rows.len();
            Ok(())
        }
        fn write_ward_snapshot(&mut self, _rows: &[WardSnapshotRow]) -> OutputResult<()> {
            Ok(())
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn first_error_kept() {
        let mut sim = small_sim(3);
        let mut obs = SimOutputObserver::new(FlakyWriter::default());
        sim.run(&mut obs).unwrap();

        let err = obs.take_error().expect("summary writes fail");
        assert!(err.to_string().contains("day 0"), "got {err}");
        assert!(obs.take_error().is_none());

        let writer = obs.into_writer();
        assert_eq!(writer.totals, 3 * 5, "later writes still happen");
        assert_eq!(writer.finished, 1);
    }

    #[test]
    fn writer_finished_after_failed_run() {
        let mut b = WardNetworkBuilder::new();
        b.add_ward(100, None);
        let network = b.build().unwrap();
        let config = SimConfig { max_days: 10, num_threads: Some(1), snapshot_interval_days: 0 };
        let mut rng = RandomStream::new(3);
        let mut sim = SimBuilder::new(Parameters::default())
            .network(network)
            .initialise(&mut rng)
            .unwrap()
            .seeds(vec![SeedRecord::new(WardId(0), Day(1), 80)])
            .unwrap()
            .build(config, rng)
            .unwrap();

        let mut obs = SimOutputObserver::new(FlakyWriter::default());
        assert!(sim.run(&mut obs).is_err(), "80 seeds into a home pool of 50");
        let writer = obs.into_writer();
        assert_eq!(writer.totals, 5, "day 0 totals written");
        assert_eq!(writer.finished, 1);
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::observer::SimOutputObserver;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn count(dir: &TempDir, table: &str) -> i64 {
        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_summary_values() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_day_summary(&DaySummaryRow::from_record(&record(7))).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (day, infected, removed): (i64, i64, i64) = conn
            .query_row(
                "SELECT day, infected, removed FROM day_summaries WHERE day = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((day, infected, removed), (7, 18, 2));
    }

    #[test]
    fn sqlite_pool_stored_as_text() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_ward_snapshot(&[WardSnapshotRow { day: 0, ward: 1, pool: Pool::Home, stage: 2, count: 4 }])
            .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let pool: String = conn
            .query_row("SELECT pool FROM ward_snapshots WHERE ward = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(pool, "home");
    }

    #[test]
    fn sqlite_duplicate_stage_total_rejected() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        let rows = StageTotalRow::from_record(&record(1));
        w.write_stage_totals(&rows).unwrap();
        assert!(w.write_stage_totals(&rows).is_err());
    }

    #[test]
    fn integration_sqlite() {
        let mut sim = small_sim(4);
        let dir = tmp();
        let mut obs = SimOutputObserver::new(SqliteWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());
        drop(obs);

        assert_eq!(count(&dir, "day_summaries"), 4);
        assert_eq!(count(&dir, "stage_totals"), 4 * 5);
        assert!(count(&dir, "ward_snapshots") >= 2 * 6);
    }
}

// ── Parquet ───────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use tempfile::TempDir;

    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;
    use crate::parquet::ParquetWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        for name in ["day_summaries.parquet", "stage_totals.parquet", "ward_snapshots.parquet"] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
    }

    #[test]
    fn parquet_snapshot_round_trip() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        let rows = vec![
            WardSnapshotRow { day: 2, ward: 0, pool: Pool::Home, stage: 0, count: 400 },
            WardSnapshotRow { day: 2, ward: 0, pool: Pool::Play, stage: 1, count: 3 },
        ];
        w.write_ward_snapshot(&rows).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("ward_snapshots.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let reader = builder.build().unwrap();

        let total_rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total_rows, 2);

        let field_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(field_names, ["day", "ward", "pool", "stage", "count"]);
        assert_eq!(*schema.field_with_name("pool").unwrap().data_type(), DataType::Utf8);
    }

    #[test]
    fn parquet_summary_rows() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        for day in 0..3 {
            w.write_day_summary(&DaySummaryRow::from_record(&record(day))).unwrap();
        }
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("day_summaries.parquet")).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap().build().unwrap();
        let total_rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total_rows, 3);
    }

    #[test]
    fn parquet_finish_required() {
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_stage_totals(&StageTotalRow::from_record(&record(0))).unwrap();
        }

        let file = std::fs::File::open(dir.path().join("stage_totals.parquet")).unwrap();
        let result = ParquetRecordBatchReaderBuilder::try_new(file);
        assert!(result.is_err(), "file without Parquet footer should fail to open");
    }
}
