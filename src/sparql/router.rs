//! Query routing
//!
//! Rewrites query text, prepends the bound prefixes, parses, and evaluates
//! against one context or the union of all contexts.

use super::results::QueryRows;
use super::rewrite::{QueryRewriter, ShorthandPrefix, Verbatim};
use super::{SparqlError, SparqlResult};
use crate::rdf::{ContextStore, NamespaceManager};
use oxigraph::sparql::{Query, QueryResults};
use tracing::{debug, warn};

/// Routes query text to the context store
#[derive(Debug, Clone, Default)]
pub struct QueryRouter<R = ShorthandPrefix> {
    rewriter: R,
}

impl QueryRouter<ShorthandPrefix> {
    /// Router that expands the `:` shorthand
    pub fn new() -> Self {
        Self {
            rewriter: ShorthandPrefix,
        }
    }
}

impl QueryRouter<Verbatim> {
    /// Router for queries that already spell out full IRIs
    pub fn verbatim() -> Self {
        Self { rewriter: Verbatim }
    }
}

impl<R: QueryRewriter> QueryRouter<R> {
    /// Router with a caller-supplied rewrite step
    pub fn with_rewriter(rewriter: R) -> Self {
        Self { rewriter }
    }

    /// Final query text: prefix declarations followed by the rewritten query
    pub fn prepare(&self, query: &str, namespaces: &NamespaceManager) -> String {
        let rewritten = self.rewriter.rewrite(query, namespaces);
        format!("{}{}", namespaces.prefix_declarations(), rewritten)
    }

    /// Parse and evaluate `query`.
    ///
    /// With a context, that context is the default graph; otherwise the
    /// default graph is the union of every context.
    pub fn route(
        &self,
        store: &ContextStore,
        namespaces: &NamespaceManager,
        query: &str,
        context: Option<&str>,
    ) -> SparqlResult<QueryRows> {
        let text = self.prepare(query, namespaces);
        debug!("Routing query to {}: {}", context.unwrap_or("all contexts"), text);

        let parsed = Query::parse(&text, None).map_err(|e| SparqlError::Parse(e.to_string()))?;
        let results = store
            .execute(parsed, context)
            .map_err(|e| SparqlError::Execution(e.to_string()))?;

        collect_rows(results)
    }

    /// [`route`](Self::route), with any error logged and replaced by empty rows
    pub fn route_or_empty(
        &self,
        store: &ContextStore,
        namespaces: &NamespaceManager,
        query: &str,
        context: Option<&str>,
    ) -> QueryRows {
        self.route(store, namespaces, query, context)
            .unwrap_or_else(|e| {
                warn!("{}", e);
                QueryRows::empty()
            })
    }
}

fn collect_rows(results: QueryResults) -> SparqlResult<QueryRows> {
    let execution = |e: oxigraph::sparql::EvaluationError| SparqlError::Execution(e.to_string());

    match results {
        QueryResults::Solutions(solutions) => {
            let variables = solutions
                .variables()
                .iter()
                .map(|v| v.as_str().to_string())
                .collect();

            let mut rows = Vec::new();
            for solution in solutions {
                let solution = solution.map_err(execution)?;
                rows.push(solution.values().to_vec());
            }
            Ok(QueryRows { variables, rows })
        }
        QueryResults::Boolean(value) => Ok(QueryRows::from_boolean(value)),
        QueryResults::Graph(triples) => {
            let triples = triples
                .collect::<Result<Vec<_>, _>>()
                .map_err(execution)?;
            Ok(QueryRows::from_triples(triples))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{Literal, NamedNode, Triple};

    const NS: &str = "https://data.lacity.org/";

    fn fixture() -> (ContextStore, NamespaceManager) {
        let mut store = ContextStore::new(format!("{}context/", NS)).unwrap();
        let report = NamedNode::new(format!("{}Report#1", NS)).unwrap();
        store
            .insert(
                "arrest_reports",
                &Triple::new(
                    report.clone(),
                    oxigraph::model::vocab::rdf::TYPE,
                    NamedNode::new(format!("{}ArrestReports", NS)).unwrap(),
                ),
            )
            .unwrap();
        store
            .insert(
                "crime_reports",
                &Triple::new(
                    report,
                    NamedNode::new(format!("{}hasID", NS)).unwrap(),
                    Literal::new_simple_literal("1"),
                ),
            )
            .unwrap();

        let mut namespaces = NamespaceManager::new();
        namespaces.bind("ns1", NS);
        (store, namespaces)
    }

    #[test]
    fn test_empty_store_yields_no_rows() {
        let store = ContextStore::new("https://data.lacity.org/context/").unwrap();
        let rows = QueryRouter::new()
            .route(&store, &NamespaceManager::new(), "SELECT * WHERE {?s ?p ?o}", None)
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(rows.variables, vec!["s", "p", "o"]);
    }

    #[test]
    fn test_shorthand_prefix_resolves() {
        let (store, namespaces) = fixture();
        let rows = QueryRouter::new()
            .route(&store, &namespaces, "SELECT ?r WHERE { ?r a :ArrestReports }", None)
            .unwrap();
        assert_eq!(
            rows.display_rows(),
            vec![vec!["https://data.lacity.org/Report#1".to_string()]]
        );
    }

    #[test]
    fn test_context_scoping() {
        let (store, namespaces) = fixture();
        let router = QueryRouter::new();
        let query = "SELECT ?s ?p ?o WHERE { ?s ?p ?o }";

        assert_eq!(router.route(&store, &namespaces, query, None).unwrap().len(), 2);
        assert_eq!(
            router.route(&store, &namespaces, query, Some("crime_reports")).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_parse_and_execution_errors_are_distinct() {
        let (store, namespaces) = fixture();
        let router = QueryRouter::new();

        assert!(matches!(
            router.route(&store, &namespaces, "SELEC nonsense", None),
            Err(SparqlError::Parse(_))
        ));
        assert!(matches!(
            router.route(&store, &namespaces, "SELECT * WHERE { ?s ?p ?o }", Some("missing")),
            Err(SparqlError::Execution(_))
        ));
    }

    #[test]
    fn test_route_or_empty_absorbs_errors() {
        let (store, namespaces) = fixture();
        let rows = QueryRouter::new().route_or_empty(&store, &namespaces, "SELEC nonsense", None);
        assert_eq!(rows, QueryRows::empty());
    }

    #[test]
    fn test_custom_rewriter() {
        struct Lowercase;
        impl QueryRewriter for Lowercase {
            fn rewrite(&self, query: &str, _namespaces: &NamespaceManager) -> String {
                query.to_lowercase()
            }
        }

        let (store, namespaces) = fixture();
        let router = QueryRouter::with_rewriter(Lowercase);
        assert!(router.prepare("SELECT ?S", &namespaces).ends_with("select ?s"));
        assert_eq!(
            router
                .route(&store, &namespaces, "SELECT ?S WHERE { ?S ns1:hasID ?ID }", None)
                .unwrap()
                .variables,
            vec!["s", "id"]
        );
    }

    #[test]
    fn test_ask_and_construct() {
        let (store, namespaces) = fixture();
        let router = QueryRouter::verbatim();

        let ask = router
            .route(&store, &namespaces, "ASK { ?s ns1:hasID \"1\" }", None)
            .unwrap();
        assert_eq!(ask.display_rows(), vec![vec!["true".to_string()]]);

        let graph = router
            .route(&store, &namespaces, "CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }", Some("arrest_reports"))
            .unwrap();
        assert_eq!(graph.variables, vec!["s", "p", "o"]);
        assert_eq!(graph.len(), 1);
    }
}
