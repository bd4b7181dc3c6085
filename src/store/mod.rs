// src/store/mod.rs

pub mod arrow;

use anyhow::{Context, Result};
use chrono::Utc;
use glob::glob;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde_json::{Map, Value};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use self::arrow::{batch_to_records, dataset_to_batch};

/// A table kept as a directory of Parquet part files, one per append:
/// `<data_dir>/<table>/part-<micros>.parquet`.
#[derive(Debug, Clone)]
pub struct TableStore {
    table: String,
    table_dir: PathBuf,
}

impl TableStore {
    /// Open (creating if needed) the directory backing `table`.
    pub fn open(data_dir: impl AsRef<Path>, table: &str) -> Result<Self> {
        let table_dir = data_dir.as_ref().join(table);
        fs::create_dir_all(&table_dir)
            .with_context(|| format!("creating table directory {:?}", &table_dir))?;
        Ok(Self {
            table: table.to_string(),
            table_dir,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn dir(&self) -> &Path {
        &self.table_dir
    }

    /// Write `ds` as a new Snappy-compressed part. Returns `None` without
    /// touching disk when there is nothing to write.
    pub fn append(&self, ds: &Dataset) -> Result<Option<PathBuf>> {
        if ds.is_empty() || ds.columns().is_empty() {
            debug!(table = %self.table, "nothing to append");
            return Ok(None);
        }

        let batch = dataset_to_batch(ds)?;
        let path = self.next_part_path();
        let tmp_path = self.table_dir.join(format!(
            ".{}.tmp",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("part")
        ));

        let file = File::create(&tmp_path)
            .with_context(|| format!("creating part file {:?}", &tmp_path))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .context("creating Arrow writer for table part")?;
        writer.write(&batch).context("writing table batch")?;
        writer.close().context("closing table writer")?;

        // parts only become visible once complete
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;

        info!(table = %self.table, rows = ds.len(), part = %path.display(), "appended");
        Ok(Some(path))
    }

    fn next_part_path(&self) -> PathBuf {
        let mut ts = Utc::now().timestamp_micros();
        loop {
            let candidate = self.table_dir.join(format!("part-{:020}.parquet", ts));
            if !candidate.exists() {
                return candidate;
            }
            ts += 1;
        }
    }

    /// Part files in write order.
    pub fn parts(&self) -> Result<Vec<PathBuf>> {
        let pattern = format!("{}/part-*.parquet", self.table_dir.display());
        let mut parts: Vec<PathBuf> = glob(&pattern)
            .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        parts.sort();
        Ok(parts)
    }

    /// Every stored row as a JSON record, oldest part first.
    pub fn load_records(&self) -> Result<Vec<Map<String, Value>>> {
        let mut records = Vec::new();
        for part in self.parts()? {
            let file = File::open(&part).with_context(|| format!("opening {:?}", &part))?;
            let reader = ParquetRecordBatchReaderBuilder::try_new(file)
                .with_context(|| format!("reading parquet metadata of {:?}", &part))?
                .build()
                .with_context(|| format!("building reader for {:?}", &part))?;
            for batch in reader {
                let batch = batch.with_context(|| format!("decoding batch from {:?}", &part))?;
                records.extend(batch_to_records(&batch));
            }
        }
        Ok(records)
    }

    /// Total rows across all parts, from Parquet footers only.
    pub fn row_count(&self) -> Result<u64> {
        let mut total = 0u64;
        for part in self.parts()? {
            let file = File::open(&part).with_context(|| format!("opening {:?}", &part))?;
            let reader = SerializedFileReader::new(file)
                .with_context(|| format!("reading parquet footer of {:?}", &part))?;
            total += reader.metadata().file_metadata().num_rows().max(0) as u64;
        }
        Ok(total)
    }

    /// Remove every row of the table. Returns the number of parts deleted.
    ///
    /// Not atomic: a concurrent append may survive or be lost.
    pub fn truncate(&self) -> Result<usize> {
        let mut removed = 0;
        for part in self.parts()? {
            match fs::remove_file(&part) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(part = %part.display(), "part vanished during truncate");
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("removing {:?}", &part));
                }
            }
        }
        info!(table = %self.table, removed, "table truncated");
        Ok(removed)
    }
}
