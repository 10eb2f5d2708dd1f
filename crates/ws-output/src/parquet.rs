//! Parquet output backend (feature `parquet`).
//!
//! Creates three files in the configured output directory:
//! - `day_summaries.parquet`
//! - `stage_totals.parquet`
//! - `ward_snapshots.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringBuilder, UInt32Builder, UInt64Builder, UInt8Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::{OutputWriter, ensure_dir};
use crate::{DaySummaryRow, OutputResult, StageTotalRow, WardSnapshotRow};

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("day",            DataType::UInt32, false),
        Field::new("susceptible",    DataType::UInt64, false),
        Field::new("infected",       DataType::UInt64, false),
        Field::new("removed",        DataType::UInt64, false),
        Field::new("new_infections", DataType::UInt64, false),
        Field::new("seeded",         DataType::UInt64, false),
        Field::new("imported",       DataType::UInt64, false),
    ]))
}

fn totals_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("day",   DataType::UInt32, false),
        Field::new("stage", DataType::UInt8,  false),
        Field::new("count", DataType::UInt64, false),
    ]))
}

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("day",   DataType::UInt32, false),
        Field::new("ward",  DataType::UInt32, false),
        Field::new("pool",  DataType::Utf8,   false),
        Field::new("stage", DataType::UInt8,  false),
        Field::new("count", DataType::UInt64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open(dir: &Path, name: &str, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let file = File::create(dir.join(name))?;
    Ok(ArrowWriter::try_new(file, Arc::clone(schema), Some(snappy_props()))?)
}

/// Writes simulation output to three Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    summaries:     Option<ArrowWriter<File>>,
    totals:        Option<ArrowWriter<File>>,
    snapshots:     Option<ArrowWriter<File>>,
    summ_schema:   Arc<Schema>,
    totals_schema: Arc<Schema>,
    snap_schema:   Arc<Schema>,
}

impl ParquetWriter {
    /// Create the three Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        ensure_dir(dir)?;

        let summ_schema   = summary_schema();
        let totals_schema = totals_schema();
        let snap_schema   = snapshot_schema();

        Ok(Self {
            summaries: Some(open(dir, "day_summaries.parquet", &summ_schema)?),
            totals:    Some(open(dir, "stage_totals.parquet", &totals_schema)?),
            snapshots: Some(open(dir, "ward_snapshots.parquet", &snap_schema)?),
            summ_schema,
            totals_schema,
            snap_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_day_summary(&mut self, row: &DaySummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut days = UInt32Builder::new();
        days.append_value(row.day);
        let column = |v: u64| -> ArrayRef {
            let mut b = UInt64Builder::new();
            b.append_value(v);
            Arc::new(b.finish())
        };

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(days.finish()),
                column(row.susceptible),
                column(row.infected),
                column(row.removed),
                column(row.new_infections),
                column(row.seeded),
                column(row.imported),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_stage_totals(&mut self, rows: &[StageTotalRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.totals.as_mut() else {
            return Ok(());
        };

        let mut days   = UInt32Builder::new();
        let mut stages = UInt8Builder::new();
        let mut counts = UInt64Builder::new();

        for row in rows {
            days.append_value(row.day);
            stages.append_value(row.stage);
            counts.append_value(row.count);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.totals_schema),
            vec![
                Arc::new(days.finish()),
                Arc::new(stages.finish()),
                Arc::new(counts.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_ward_snapshot(&mut self, rows: &[WardSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut days   = UInt32Builder::new();
        let mut wards  = UInt32Builder::new();
        let mut pools  = StringBuilder::new();
        let mut stages = UInt8Builder::new();
        let mut counts = UInt64Builder::new();

        for row in rows {
            days.append_value(row.day);
            wards.append_value(row.ward);
            pools.append_value(row.pool.as_str());
            stages.append_value(row.stage);
            counts.append_value(row.count);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(days.finish()),
                Arc::new(wards.finish()),
                Arc::new(pools.finish()),
                Arc::new(stages.finish()),
                Arc::new(counts.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        for slot in [&mut self.summaries, &mut self.totals, &mut self.snapshots] {
            if let Some(w) = slot.take() {
                w.close()?;
            }
        }
        Ok(())
    }
}
