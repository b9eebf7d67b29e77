//! Dataset ingestion
//!
//! Raw dataset → [`normalize_table`] → [`EntityResolver`] → [`GraphBuilder`],
//! which writes one named context per dataset into a
//! [`ContextStore`](crate::rdf::ContextStore).
//!
//! # Example
//!
//! ```rust
//! use safety_graph::ingest::{normalize_table, GraphBuilder, Table, ARREST_REPORTS};
//! use safety_graph::rdf::ContextStore;
//!
//! let header = ARREST_REPORTS.required_fields().iter().map(|f| f.to_string()).collect();
//! let row = ARREST_REPORTS.required_fields().iter().map(|_| "1".to_string()).collect();
//! let mut table = Table::from_rows(header, vec![row]).unwrap();
//! normalize_table(&mut table);
//!
//! let mut store = ContextStore::new("https://data.lacity.org/context/").unwrap();
//! let report = GraphBuilder::new(&mut store)
//!     .build(&table, &ARREST_REPORTS, "https://data.lacity.org/", "arrest_reports")
//!     .unwrap();
//!
//! assert_eq!(report.rejected, 0);
//! assert!(report.inserted > 0);
//! ```

mod builder;
mod fetch;
mod normalize;
mod resolver;
mod schema;
mod table;

pub use builder::{record_triples, BuildError, BuildReport, BuildResult, GraphBuilder};

pub use fetch::{
    count_url, csv_url, parse_count, DatasetFetcher, FetchError, FetchProgress, FetchResult,
};

pub use normalize::{normalize_column, normalize_table, normalize_value};

pub use resolver::{identity_digest, EntityResolver, ResolveError, ResolveResult};

pub use schema::{
    Attribute, DatasetSchema, EntityKind, EntitySpec, ScalarKind, ARREST_REPORTS, CRIME_REPORTS,
    DATASETS,
};

pub use table::{Record, Table, TableError, TableResult};
