//! Column headers from the projection clause of a query

use regex::Regex;
use std::sync::OnceLock;

/// Derives display headers for query results
pub trait HeaderInference {
    /// Headers for `query`, where `width` is the number of cells in the
    /// first result row (0 when there are no rows)
    fn infer(&self, query: &str, width: usize) -> Vec<String>;
}

fn where_keyword() -> &'static Regex {
    static WHERE: OnceLock<Regex> = OnceLock::new();
    WHERE.get_or_init(|| Regex::new(r"(?i)\bwhere\b").expect("WHERE pattern is valid"))
}

/// Reads `?var` labels off the text before `WHERE`.
///
/// `*` projections are labelled by position. Otherwise tokens are grouped
/// until their parentheses balance, and each group ending in a `?var`
/// contributes that variable, so `(COUNT(?o) AS ?n)` yields `?n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionHeaders;

impl ProjectionHeaders {
    fn projection(query: &str) -> &str {
        match where_keyword().find(query) {
            Some(m) => &query[..m.start()],
            None => query,
        }
    }
}

impl HeaderInference for ProjectionHeaders {
    fn infer(&self, query: &str, width: usize) -> Vec<String> {
        let projection = Self::projection(query);

        if projection.contains('*') {
            return (0..width).map(|i| i.to_string()).collect();
        }

        let mut headers = Vec::new();
        let mut depth: i64 = 0;

        for token in projection.split_whitespace() {
            depth += token.matches('(').count() as i64;
            depth -= token.matches(')').count() as i64;

            if depth <= 0 {
                // The token closing a group carries its label
                let label = token.strip_suffix(')').unwrap_or(token);
                if label.starts_with('?') && label.len() > 1 {
                    headers.push(label.to_string());
                }
                depth = 0;
            }
        }

        headers
    }
}
