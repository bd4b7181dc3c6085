// src/normalize/mod.rs
//
// Canonicalises the column layout of a spreadsheet export:
//   1) alias renaming (`TOTAL` → `total`, `Tipo` → `tipo_residuo`, …)
//   2) month renaming (`jan/18`, `janeiro/18` → `janeiro`)
//   3) null-fill of the numeric columns
//   4) numeric coercion of the numeric columns (`"1,5"` → 1.5, junk → 0)

pub mod aliases;
pub mod months;

use crate::dataset::{Cell, Dataset};
use tracing::{debug, warn};

pub use aliases::COLUMN_ALIASES;
pub use months::{is_month, MONTHS, MONTH_PATTERNS};

/// `total` or one of the twelve month names.
pub fn is_numeric_column(name: &str) -> bool {
    name == "total" || is_month(name)
}

/// Normalize `dataset` into the canonical column vocabulary.
///
/// Never fails: cells that cannot be read as numbers become `0`, and a
/// canonical column with no matching source column is simply absent.
#[tracing::instrument(level = "debug", skip(dataset), fields(rows = dataset.len(), cols = dataset.columns().len()))]
pub fn normalize(mut dataset: Dataset) -> Dataset {
    rename_aliases(&mut dataset);
    rename_months(&mut dataset);

    let numeric: Vec<String> = dataset
        .columns()
        .iter()
        .filter(|c| is_numeric_column(c))
        .cloned()
        .collect();

    for col in &numeric {
        dataset.map_column(col, |cell| match cell {
            Cell::Null => Cell::Number(0.0),
            other => other.clone(),
        });
    }
    for col in &numeric {
        dataset.map_column(col, |cell| Cell::Number(coerce_number(cell)));
    }

    debug!(numeric = numeric.len(), "normalized");
    dataset
}

/// First alias present wins; the rest stay under their original names.
fn rename_aliases(dataset: &mut Dataset) {
    for (canonical, aliases) in COLUMN_ALIASES {
        if dataset.has_column(canonical) {
            debug!(canonical, "canonical column already present");
            continue;
        }
        if let Some(alias) = aliases.iter().find(|a| dataset.has_column(a)) {
            dataset.rename_column(alias, canonical);
            debug!(alias, canonical, "renamed alias");
        }
    }
}

fn rename_months(dataset: &mut Dataset) {
    for pattern in MONTH_PATTERNS.iter() {
        let candidates: Vec<String> = dataset
            .columns()
            .iter()
            .filter(|c| pattern.matches(c))
            .cloned()
            .collect();

        for col in candidates {
            if dataset.rename_column(&col, pattern.name) {
                debug!(column = %col, month = pattern.name, "renamed month");
            } else {
                warn!(column = %col, month = pattern.name, "month column already present; left as is");
            }
        }
    }
}

/// Text form with `,` as decimal separator → f64. Anything unreadable or
/// non-finite → 0, since JSON has no representation for it.
fn coerce_number(cell: &Cell) -> f64 {
    let text = cell.to_string().replace(',', ".");
    match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}
