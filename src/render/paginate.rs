//! Fixed-size result pages

use crate::sparql::{HeaderInference, QueryRows};

/// Rows per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One page of display rows; every page of a result repeats its header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Zero-based page number
    pub number: usize,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Split `rows` into pages of `page_size` rows, order preserved.
///
/// No rows gives one header-only page. A page size of 0 is treated as 1.
pub fn paginate(rows: Vec<Vec<String>>, header: &[String], page_size: usize) -> Vec<Page> {
    let page_size = page_size.max(1);

    if rows.is_empty() {
        return vec![Page {
            number: 0,
            header: header.to_vec(),
            rows: Vec::new(),
        }];
    }

    let mut pages = Vec::with_capacity(rows.len().div_ceil(page_size));
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        pages.push(Page {
            number: pages.len(),
            header: header.to_vec(),
            rows: rows.by_ref().take(page_size).collect(),
        });
    }
    pages
}

/// Header for a result: inferred from the query text when that yields one
/// label per column, otherwise the engine's variable names as `?var`
pub fn result_header(query: &str, rows: &QueryRows, inference: &impl HeaderInference) -> Vec<String> {
    let width = rows.rows.first().map_or(0, Vec::len);
    let inferred = inference.infer(query, width);

    if inferred.len() == rows.variables.len() {
        inferred
    } else {
        rows.variables.iter().map(|v| format!("?{}", v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::ProjectionHeaders;

    fn rows(n: usize) -> Vec<Vec<String>> {
        (0..n).map(|i| vec![i.to_string()]).collect()
    }

    fn header() -> Vec<String> {
        vec!["?s".to_string()]
    }

    #[test]
    fn test_empty_rows_give_header_only_page() {
        let pages = paginate(Vec::new(), &header(), 1000);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].header, header());
        assert!(pages[0].rows.is_empty());
    }

    #[test]
    fn test_page_count_and_conservation() {
        for (n, size, expected) in [(1, 1000, 1), (1000, 1000, 1), (1001, 1000, 2), (2500, 1000, 3), (7, 2, 4)] {
            let pages = paginate(rows(n), &header(), size);
            assert_eq!(pages.len(), expected, "n={} size={}", n, size);

            let flattened: Vec<_> = pages.iter().flat_map(|p| p.rows.clone()).collect();
            assert_eq!(flattened, rows(n));

            // Only the last page may be short
            for page in &pages[..pages.len() - 1] {
                assert_eq!(page.rows.len(), size);
            }
            assert!(pages.iter().all(|p| p.header == header()));
            assert!(pages.iter().enumerate().all(|(i, p)| p.number == i));
        }
    }

    #[test]
    fn test_zero_page_size_is_one() {
        assert_eq!(paginate(rows(3), &header(), 0).len(), 3);
    }

    #[test]
    fn test_result_header_falls_back_to_variables() {
        let result = QueryRows {
            variables: vec!["s".to_string(), "p".to_string()],
            rows: Vec::new(),
        };
        // `*` with no rows infers nothing
        assert_eq!(
            result_header("SELECT * WHERE { ?s ?p ?o }", &result, &ProjectionHeaders),
            vec!["?s", "?p"]
        );
        assert_eq!(
            result_header("SELECT ?s ?p WHERE { ?s ?p ?o }", &result, &ProjectionHeaders),
            vec!["?s", "?p"]
        );
    }
}
