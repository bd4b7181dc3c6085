// src/ingest/mod.rs

pub mod delimited;
pub mod encoding;
pub mod workbook;

use anyhow::{bail, Context, Result};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::dataset::{Cell, Dataset};
use crate::normalize::normalize;
use crate::store::TableStore;

pub use delimited::load_delimited;
pub use workbook::load_workbook;

/// Outcome of ingesting one spreadsheet.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub file: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
    /// `None` when the file had no data rows.
    pub part: Option<PathBuf>,
}

/// Read a spreadsheet into a [`Dataset`], picking the loader by extension.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.display()))]
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let ds = match ext.as_str() {
        "csv" | "txt" | "tsv" => load_delimited(path)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path)?,
        _ => bail!("unsupported spreadsheet type: {}", path.display()),
    };
    info!(rows = ds.len(), cols = ds.columns().len(), "loaded");
    Ok(ds)
}

/// Load, normalize and append one file to `store`. When `year` is given the
/// rows are tagged with an `ano` column.
#[tracing::instrument(level = "info", skip(store, path), fields(path = %path.display()))]
pub fn ingest_file(store: &TableStore, path: &Path, year: Option<i32>) -> Result<IngestSummary> {
    let raw = load_dataset(path)?;
    let mut ds = normalize(raw);

    if let Some(year) = year {
        if !ds.push_column("ano", Cell::Number(f64::from(year))) {
            ds.map_column("ano", |_| Cell::Number(f64::from(year)));
        }
    }

    let part = store
        .append(&ds)
        .with_context(|| format!("storing rows from {}", path.display()))?;
    info!(rows = ds.len(), "ingested");

    Ok(IngestSummary {
        file: path.to_path_buf(),
        rows: ds.len(),
        columns: ds.columns().to_vec(),
        part,
    })
}

/// Make header names usable as dataset columns: blanks become
/// `coluna_<n>` (1-based), repeats get `.1`, `.2`, … suffixes.
pub fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.trim().is_empty() {
                format!("coluna_{}", idx + 1)
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                candidate = format!("{}.{}", base, n);
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::init_test_logging;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn headers_are_made_unique() {
        let raw = vec!["Tipo", "", "Tipo", "Tipo", "Tipo.1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            unique_headers(raw),
            ["Tipo", "coluna_2", "Tipo.1", "Tipo.2", "Tipo.1.1"]
        );
    }

    #[test]
    fn rejects_unknown_extensions() {
        let err = load_dataset(Path::new("relatorio.pdf")).unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn ingest_normalizes_and_stores() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let csv_path = dir.path().join("2018.csv");
        fs::write(
            &csv_path,
            "Tipo;jan/18;fev/18;TOTAL 2018\nPapel;1,5;;1,5\nVidro;2;3;5\n",
        )?;

        let store = TableStore::open(dir.path().join("data"), "coleta_residuos")?;
        let summary = ingest_file(&store, &csv_path, Some(2018))?;

        assert_eq!(summary.rows, 2);
        assert_eq!(
            summary.columns,
            ["tipo_residuo", "janeiro", "fevereiro", "total", "ano"]
        );
        assert!(summary.part.is_some());

        let records = store.load_records()?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["tipo_residuo"], "Papel");
        assert_eq!(records[0]["fevereiro"], 0.0);
        assert_eq!(records[1]["total"], 5.0);
        assert_eq!(records[1]["ano"], 2018.0);
        Ok(())
    }
}
