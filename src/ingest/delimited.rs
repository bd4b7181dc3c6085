// src/ingest/delimited.rs

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::{fs, path::Path};
use tracing::debug;

use super::{encoding::decode_text, unique_headers};
use crate::dataset::{Cell, Dataset};

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const SAMPLE_LINES: usize = 10;

/// Load a delimited text export (CSV, semicolon CSV, TSV).
pub fn load_delimited(path: &Path) -> Result<Dataset> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_delimited(&decode_text(&bytes))
        .with_context(|| format!("parsing {}", path.display()))
}

/// Parse already-decoded text. The first record is the header.
pub fn parse_delimited(content: &str) -> Result<Dataset> {
    let delimiter = detect_delimiter(content);
    let shown = (delimiter as char).escape_default().to_string();
    debug!(delimiter = %shown, "detected delimiter");

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::Fields)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut ds = Dataset::new(unique_headers(headers));

    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        ds.push_row(row);
    }

    Ok(ds)
}

/// Pick the candidate that splits the first lines most often and most
/// consistently. Falls back to `,`.
pub fn detect_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0.0f32;
    for &delimiter in &CANDIDATE_DELIMITERS {
        let counts: Vec<f32> = sample
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count() as f32)
            .collect();
        let n = counts.len() as f32;
        let avg = counts.iter().sum::<f32>() / n;
        let variance = counts.iter().map(|c| (c - avg).powi(2)).sum::<f32>() / n;
        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }
    best
}
