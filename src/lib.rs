//! Safety Graph
//!
//! Builds a deduplicated RDF graph from the LA arrest and crime report
//! datasets and serves paginated, hyperlinked SPARQL results over it.
//!
//! # Architecture
//!
//! - `ingest`: download, normalize, resolve entities and build triples, one
//!   named context per dataset
//! - `rdf`: the context store, prefix bindings and RDF/XML persistence
//! - `sparql`: query rewriting, routing and header inference
//! - `render`: pagination, hyperlinked pages and the `nav://` protocol
//! - `session`: an owned [`GraphSession`] tying these together
//!
//! Entity identity is content-derived: a Person with the same age, sex and
//! descent codes is the same node no matter how many reports mention it.
//! Entities are never unified across contexts.
//!
//! ## Example Usage
//!
//! ```rust
//! use safety_graph::{GraphSession, SessionConfig};
//! use safety_graph::ingest::{Table, ARREST_REPORTS};
//!
//! let mut session = GraphSession::new(SessionConfig::default()).unwrap();
//!
//! let fields = ARREST_REPORTS.required_fields();
//! let header = fields.iter().map(|f| f.to_string()).collect();
//! let row = fields.iter().map(|f| if *f == "rpt_id" { "5568617".to_string() } else { "x".to_string() }).collect();
//! let mut table = Table::from_rows(header, vec![row]).unwrap();
//! session.build_dataset(&mut table, &ARREST_REPORTS).unwrap();
//!
//! let page = session.run_query("SELECT ?r WHERE { ?r a :ArrestReports }", None).unwrap();
//! assert_eq!(page.rows.len(), 1);
//! assert!(page.to_html().contains("nav://query/"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod ingest;
pub mod rdf;
pub mod render;
pub mod session;
pub mod sparql;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, SessionConfig};

pub use ingest::{
    BuildReport, DatasetFetcher, DatasetSchema, EntityKind, EntityResolver, FetchError,
    GraphBuilder, ResolveError, Table, ARREST_REPORTS, CRIME_REPORTS, DATASETS,
};

pub use rdf::{ContextStore, Namespace, NamespaceManager, RdfParser, RdfSerializer, StoreError};

pub use render::{
    HyperlinkRewriter, LinkResolver, NavRequest, NavResponse, Page, RenderedPage,
    DEFAULT_PAGE_SIZE,
};

pub use session::{
    DatasetOutcome, GraphSession, ImportOutcome, ImportPathError, SessionError, SessionResult,
};

pub use sparql::{QueryRouter, QueryRows, SparqlError, SparqlResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
