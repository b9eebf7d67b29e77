//! RDF storage for the safety graph
//!
//! This module provides:
//! - a context store: one named graph per imported dataset or file, plus a
//!   union view over all of them
//! - ordered namespace prefix bindings
//! - pretty-printed RDF/XML import and export
//!
//! # Example
//!
//! ```rust
//! use safety_graph::rdf::ContextStore;
//! use oxigraph::model::{Literal, NamedNode, Triple};
//!
//! let mut store = ContextStore::new("https://data.lacity.org/context/").unwrap();
//!
//! let triple = Triple::new(
//!     NamedNode::new("https://data.lacity.org/Report#00").unwrap(),
//!     NamedNode::new("https://data.lacity.org/hasID").unwrap(),
//!     Literal::new_simple_literal("1"),
//! );
//!
//! assert!(store.insert("arrest_reports", &triple).unwrap());
//! assert!(!store.insert("arrest_reports", &triple).unwrap());
//! assert_eq!(store.context_len("arrest_reports").unwrap(), 1);
//! ```

mod namespace;
mod serialization;
mod store;

pub use namespace::{Namespace, NamespaceManager, PrefixError, PrefixResult};

pub use serialization::{
    ParseError, ParseResult, RdfParser, RdfSerializer, SerializeError, SerializeResult,
};

pub use store::{ContextStore, StoreError, StoreResult};
