//! Context store
//!
//! A quad store partitioned into named contexts, one per imported dataset or
//! file. Backed by the in-memory oxigraph store, which also evaluates SPARQL
//! either against one context or against the union of all of them.

use indexmap::IndexSet;
use oxigraph::model::{GraphName, GraphNameRef, NamedNode, NamedOrBlankNode, Quad, Triple};
use oxigraph::sparql::{Query, QueryResults};
use oxigraph::store::{StorageError, Store};
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::debug;

/// Context store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Context not found
    #[error("Context not found: {0}")]
    UnknownContext(String),

    /// Context base IRI is not a valid IRI
    #[error("Invalid context base IRI: {0}")]
    InvalidBase(String),

    /// Query evaluation failure
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Quad store with one named graph per context
pub struct ContextStore {
    store: Store,
    /// IRI prefix of every context graph name
    context_base: String,
}

impl ContextStore {
    /// Create an empty store whose context graph names live under `context_base`
    pub fn new(context_base: impl Into<String>) -> StoreResult<Self> {
        let context_base = context_base.into();
        NamedNode::new(format!("{}probe", context_base))
            .map_err(|_| StoreError::InvalidBase(context_base.clone()))?;

        Ok(Self {
            store: Store::new()?,
            context_base,
        })
    }

    /// Graph name of a context
    pub fn context_iri(&self, context: &str) -> NamedNode {
        let encoded = utf8_percent_encode(context, NON_ALPHANUMERIC);
        NamedNode::new_unchecked(format!("{}{}", self.context_base, encoded))
    }

    fn context_id(&self, graph: &NamedOrBlankNode) -> Option<String> {
        match graph {
            NamedOrBlankNode::NamedNode(node) => node
                .as_str()
                .strip_prefix(self.context_base.as_str())
                .map(|encoded| percent_decode_str(encoded).decode_utf8_lossy().into_owned()),
            _ => None,
        }
    }

    /// Insert a triple into a context. The context is created on first write.
    ///
    /// Returns `false` if the triple was already present.
    pub fn insert(&mut self, context: &str, triple: &Triple) -> StoreResult<bool> {
        let quad = Quad::new(
            triple.subject.clone(),
            triple.predicate.clone(),
            triple.object.clone(),
            self.context_iri(context),
        );
        Ok(self.store.insert(&quad)?)
    }

    /// Insert many triples into a context, returning how many were new
    pub fn extend<'a>(
        &mut self,
        context: &str,
        triples: impl IntoIterator<Item = &'a Triple>,
    ) -> StoreResult<usize> {
        let mut inserted = 0;
        for triple in triples {
            if self.insert(context, triple)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Check if a context exists
    pub fn contains_context(&self, context: &str) -> StoreResult<bool> {
        Ok(self.store.contains_named_graph(self.context_iri(context).as_ref())?)
    }

    /// List all contexts
    pub fn contexts(&self) -> StoreResult<Vec<String>> {
        let mut contexts = Vec::new();
        for graph in self.store.named_graphs() {
            if let Some(id) = self.context_id(&graph?) {
                contexts.push(id);
            }
        }
        contexts.sort();
        Ok(contexts)
    }

    /// Total number of quads across all contexts
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.store.len()?)
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.store.is_empty()?)
    }

    /// Number of triples in one context
    pub fn context_len(&self, context: &str) -> StoreResult<usize> {
        let graph = self.context_iri(context);
        let mut count = 0;
        for quad in self.store.quads_for_pattern(
            None,
            None,
            None,
            Some(GraphNameRef::NamedNode(graph.as_ref())),
        ) {
            quad?;
            count += 1;
        }
        Ok(count)
    }

    /// Triples of one context, or the deduplicated union of every context
    pub fn triples(&self, context: Option<&str>) -> StoreResult<Vec<Triple>> {
        if let Some(id) = context {
            if !self.contains_context(id)? {
                return Err(StoreError::UnknownContext(id.to_string()));
            }
        }
        let graph = context.map(|c| self.context_iri(c));

        let mut triples = IndexSet::new();
        for quad in self.store.quads_for_pattern(
            None,
            None,
            None,
            graph.as_ref().map(|g| GraphNameRef::NamedNode(g.as_ref())),
        ) {
            let quad = quad?;
            triples.insert(Triple::new(quad.subject, quad.predicate, quad.object));
        }
        Ok(triples.into_iter().collect())
    }

    /// Drop a whole context, returning whether it existed
    pub fn drop_context(&mut self, context: &str) -> StoreResult<bool> {
        let graph = self.context_iri(context);
        debug!("Dropping context {}", graph);
        Ok(self.store.remove_named_graph(graph.as_ref())?)
    }

    /// Evaluate a parsed query against one context or the union of all contexts
    pub fn execute(&self, mut query: Query, context: Option<&str>) -> StoreResult<QueryResults> {
        match context {
            Some(id) => {
                if !self.contains_context(id)? {
                    return Err(StoreError::UnknownContext(id.to_string()));
                }
                query
                    .dataset_mut()
                    .set_default_graph(vec![GraphName::NamedNode(self.context_iri(id))]);
            }
            None => query.dataset_mut().set_default_graph_as_union(),
        }

        self.store
            .query(query)
            .map_err(|e| StoreError::Evaluation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::Literal;

    const BASE: &str = "https://data.lacity.org/context/";

    fn triple(subject: &str, value: &str) -> Triple {
        Triple::new(
            NamedNode::new(format!("https://data.lacity.org/{}", subject)).unwrap(),
            NamedNode::new("https://data.lacity.org/hasID").unwrap(),
            Literal::new_simple_literal(value),
        )
    }

    #[test]
    fn test_insert_has_set_semantics() {
        let mut store = ContextStore::new(BASE).unwrap();
        let t = triple("Report#1", "1");

        assert!(store.insert("arrest_reports", &t).unwrap());
        assert!(!store.insert("arrest_reports", &t).unwrap());
        assert_eq!(store.context_len("arrest_reports").unwrap(), 1);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut store = ContextStore::new(BASE).unwrap();
        let t = triple("Report#1", "1");

        store.insert("arrest_reports", &t).unwrap();
        store.insert("crime_reports", &t).unwrap();
        store.insert("crime_reports", &triple("Report#2", "2")).unwrap();

        assert_eq!(store.contexts().unwrap(), vec!["arrest_reports", "crime_reports"]);
        assert_eq!(store.context_len("arrest_reports").unwrap(), 1);
        assert_eq!(store.context_len("crime_reports").unwrap(), 2);
        // The union view deduplicates the shared triple
        assert_eq!(store.triples(None).unwrap().len(), 2);
    }

    #[test]
    fn test_context_ids_with_spaces_round_trip() {
        let mut store = ContextStore::new(BASE).unwrap();
        store.insert("my export", &triple("Report#1", "1")).unwrap();

        assert!(store.contains_context("my export").unwrap());
        assert_eq!(store.contexts().unwrap(), vec!["my export"]);
    }

    #[test]
    fn test_unknown_context() {
        let store = ContextStore::new(BASE).unwrap();
        assert!(matches!(
            store.triples(Some("missing")),
            Err(StoreError::UnknownContext(_))
        ));
        assert!(!store.contains_context("missing").unwrap());
    }

    #[test]
    fn test_drop_context() {
        let mut store = ContextStore::new(BASE).unwrap();
        store.insert("a", &triple("Report#1", "1")).unwrap();
        store.insert("b", &triple("Report#2", "2")).unwrap();

        assert!(store.drop_context("a").unwrap());
        assert_eq!(store.contexts().unwrap(), vec!["b"]);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            ContextStore::new("not an iri"),
            Err(StoreError::InvalidBase(_))
        ));
    }
}
