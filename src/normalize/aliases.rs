// src/normalize/aliases.rs

/// Canonical column → literal spellings seen in the source spreadsheets.
///
/// Both levels are ordered: canonical names are resolved top to bottom, and
/// within one entry the first alias present in a dataset wins.
pub static COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (
        "tipo_residuo",
        &[
            "TIPO DE RESÍDUO",
            "Tipo Residuo",
            "resíduo",
            "Tipo",
            "Resíduo",
            "Tipo de resíduo - Toneladas",
        ],
    ),
    ("total", &["TOTAL", "total", "Total", "TOTAL 2018"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn aliases_for(canonical: &str) -> Option<&'static [&'static str]> {
        COLUMN_ALIASES
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, aliases)| *aliases)
    }

    #[test]
    fn no_alias_is_claimed_twice() {
        let mut seen = HashSet::new();
        for (_, aliases) in COLUMN_ALIASES {
            for a in *aliases {
                assert!(seen.insert(*a), "alias {a:?} listed twice");
            }
        }
    }

    #[test]
    fn total_prefers_upper_case() {
        assert_eq!(aliases_for("total").unwrap()[0], "TOTAL");
        assert!(aliases_for("janeiro").is_none());
    }
}
