// src/normalize/months.rs

use once_cell::sync::Lazy;
use regex::Regex;

/// Calendar order: (canonical name, abbreviation used in `mmm/yy` headers).
pub static MONTHS: [(&str, &str); 12] = [
    ("janeiro", "jan"),
    ("fevereiro", "fev"),
    ("marco", "mar"),
    ("abril", "abr"),
    ("maio", "mai"),
    ("junho", "jun"),
    ("julho", "jul"),
    ("agosto", "ago"),
    ("setembro", "set"),
    ("outubro", "out"),
    ("novembro", "nov"),
    ("dezembro", "dez"),
];

/// One entry per month: canonical name plus the anchored `abbr/yy` and
/// `full/yy` patterns.
pub struct MonthPattern {
    pub name: &'static str,
    abbreviated: Regex,
    full: Regex,
}

impl MonthPattern {
    pub fn matches(&self, column: &str) -> bool {
        self.abbreviated.is_match(column) || self.full.is_match(column)
    }
}

fn anchored(token: &str) -> Regex {
    Regex::new(&format!(r"^{}/\d{{2}}$", regex::escape(token)))
        .expect("month pattern is a valid regex")
}

pub static MONTH_PATTERNS: Lazy<Vec<MonthPattern>> = Lazy::new(|| {
    MONTHS
        .iter()
        .map(|&(name, abbr)| MonthPattern {
            name,
            abbreviated: anchored(abbr),
            full: anchored(name),
        })
        .collect()
});

pub fn is_month(column: &str) -> bool {
    MONTHS.iter().any(|(name, _)| *name == column)
}
