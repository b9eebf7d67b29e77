//! SPARQL 1.1 query routing
//!
//! Query text is rewritten, prefixed with the bound namespaces, parsed and
//! evaluated by the store. Results come back as [`QueryRows`], with column
//! headers inferred from the projection clause.
//!
//! # Example
//!
//! ```rust
//! use safety_graph::rdf::{ContextStore, NamespaceManager};
//! use safety_graph::sparql::QueryRouter;
//!
//! let store = ContextStore::new("https://data.lacity.org/context/").unwrap();
//! let mut namespaces = NamespaceManager::new();
//! namespaces.bind("ns1", "https://data.lacity.org/");
//!
//! let rows = QueryRouter::new()
//!     .route(&store, &namespaces, "SELECT ?r WHERE { ?r a :ArrestReports }", None)
//!     .unwrap();
//! assert!(rows.is_empty());
//! ```

mod headers;
mod results;
mod rewrite;
mod router;

pub use headers::{HeaderInference, ProjectionHeaders};
pub use results::{display_term, QueryRows};
pub use rewrite::{QueryRewriter, ShorthandPrefix, Verbatim};
pub use router::QueryRouter;

use thiserror::Error;

/// SPARQL errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparqlError {
    /// Query text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Query failed during evaluation
    #[error("Execution error: {0}")]
    Execution(String),
}

pub type SparqlResult<T> = Result<T, SparqlError>;
