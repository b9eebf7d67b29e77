//! SPARQL query results

use oxigraph::model::{Term, Triple};
use serde::Serialize;

/// Tabular query results
///
/// Every row has one cell per variable; unbound cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    /// Variable names, without the leading `?`
    pub variables: Vec<String>,
    pub rows: Vec<Vec<Option<Term>>>,
}

impl QueryRows {
    /// Create empty results
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Single `?result` row for an ASK query
    pub fn from_boolean(value: bool) -> Self {
        Self {
            variables: vec!["result".to_string()],
            rows: vec![vec![Some(Term::from(oxigraph::model::Literal::from(value)))]],
        }
    }

    /// `?s ?p ?o` rows for a graph result
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        Self {
            variables: vec!["s".to_string(), "p".to_string(), "o".to_string()],
            rows: triples
                .into_iter()
                .map(|t| vec![Some(t.subject.into()), Some(t.predicate.into()), Some(t.object)])
                .collect(),
        }
    }

    /// Rows as display strings
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| display_term(cell.as_ref())).collect())
            .collect()
    }

    /// Results in the SPARQL JSON results shape, values as display strings
    pub fn to_json(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct Head<'a> {
            vars: &'a [String],
        }

        let bindings: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.variables
                    .iter()
                    .zip(row)
                    .filter_map(|(var, cell)| {
                        cell.as_ref()
                            .map(|term| (var.clone(), serde_json::Value::String(display_term(Some(term)))))
                    })
                    .collect()
            })
            .collect();

        serde_json::json!({
            "head": Head { vars: &self.variables },
            "results": { "bindings": bindings },
        })
    }
}

/// Display form of one cell: IRIs bare, literals by lexical value, blank
/// nodes as `_:id`, unbound as the empty string
pub fn display_term(term: Option<&Term>) -> String {
    match term {
        Some(Term::NamedNode(node)) => node.as_str().to_string(),
        Some(Term::BlankNode(node)) => format!("_:{}", node.as_str()),
        Some(Term::Literal(literal)) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
