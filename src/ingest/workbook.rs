// src/ingest/workbook.rs

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

use super::unique_headers;
use crate::dataset::{Cell, Dataset};

/// Load the first worksheet of an Excel/ODS workbook. The first row is the
/// header.
pub fn load_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook has no sheets")?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;
    debug!(sheet = %sheet_name, "reading worksheet");

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(h) => h,
        None => return Ok(Dataset::default()),
    };
    let names: Vec<String> = header.iter().map(header_name).collect();
    let mut ds = Dataset::new(unique_headers(names));

    for row in rows {
        ds.push_row(row.iter().map(to_cell).collect());
    }
    Ok(ds)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::String(s) if s.trim().is_empty() => Cell::Null,
        Data::String(s) => Cell::Text(s.trim().to_string()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::tempdir;

    #[test]
    fn reads_first_sheet() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("coleta.xlsx");

        let mut wb = Workbook::new();
        let sheet = wb.add_worksheet();
        sheet.write_string(0, 0, "Tipo de resíduo - Toneladas")?;
        sheet.write_string(0, 1, "jan/18")?;
        sheet.write_number(0, 2, 2018)?;
        sheet.write_string(0, 3, " TOTAL ")?;
        sheet.write_number(0, 4, 1e20)?;
        sheet.write_string(1, 0, "Orgânico")?;
        sheet.write_number(1, 1, 10.5)?;
        sheet.write_string(2, 0, "Rejeito")?;
        sheet.write_string(2, 1, "3,25")?;
        sheet.write_boolean(2, 2, true)?;
        wb.save(&path)?;

        let ds = load_workbook(&path)?;
        assert_eq!(
            ds.columns(),
            [
                "Tipo de resíduo - Toneladas",
                "jan/18",
                "2018",
                " TOTAL ",
                "100000000000000000000",
            ]
        );
        assert_eq!(
            ds.rows()[0],
            vec![Cell::from("Orgânico"), Cell::Number(10.5), Cell::Null, Cell::Null, Cell::Null]
        );
        assert_eq!(
            ds.rows()[1],
            vec![Cell::from("Rejeito"), Cell::from("3,25"), Cell::from("true"), Cell::Null, Cell::Null]
        );
        Ok(())
    }
}
