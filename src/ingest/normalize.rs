//! Record normalization
//!
//! Values are upper-cased and runs of spaces collapsed to one space, so two
//! records that differ only in letter case or incidental spacing hash to the
//! same identity and display the same literal.

use super::table::Table;
use rayon::prelude::*;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::info;

fn space_runs() -> &'static Regex {
    static SPACE_RUNS: OnceLock<Regex> = OnceLock::new();
    SPACE_RUNS.get_or_init(|| Regex::new(" {2,}").expect("space-run pattern is valid"))
}

/// Canonical form of one raw value
pub fn normalize_value(raw: &str) -> String {
    let upper = raw.to_uppercase();
    match space_runs().replace_all(&upper, " ") {
        Cow::Borrowed(_) => upper,
        Cow::Owned(collapsed) => collapsed,
    }
}

/// Canonical form of one column, order preserved
pub fn normalize_column(column: &[String]) -> Vec<String> {
    column.iter().map(|value| normalize_value(value)).collect()
}

/// Normalize every column of a table in place, columns in parallel
pub fn normalize_table(table: &mut Table) {
    info!("Normalizing {} records...", table.len());
    table
        .columns_mut()
        .par_iter_mut()
        .for_each(|column| *column = normalize_column(column));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_and_collapse() {
        assert_eq!(normalize_value("77th  Street"), "77TH STREET");
        assert_eq!(normalize_value("  hollywood   and  vine "), " HOLLYWOOD AND VINE ");
        assert_eq!(normalize_value("M"), "M");
        assert_eq!(normalize_value(""), "");
    }

    #[test]
    fn test_only_spaces_collapse() {
        // Tabs are not part of a space run
        assert_eq!(normalize_value("a\t\tb"), "A\t\tB");
    }

    #[test]
    fn test_normalized_values_are_fixed_points() {
        for raw in ["6th   st", "Van Nuys", "  x  "] {
            let once = normalize_value(raw);
            assert_eq!(normalize_value(&once), once);
        }
    }

    #[test]
    fn test_normalize_table() {
        let mut table = Table::from_rows(
            vec!["location".to_string(), "sex_cd".to_string()],
            vec![
                vec!["6th  st".to_string(), "m".to_string()],
                vec!["6TH ST".to_string(), "M".to_string()],
            ],
        )
        .unwrap();

        normalize_table(&mut table);

        let location = table.column("location").unwrap();
        assert_eq!(location[0], location[1]);
        assert_eq!(table.column("sex_cd").unwrap(), &["M".to_string(), "M".to_string()][..]);
    }
}
