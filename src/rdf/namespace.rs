//! RDF namespace and prefix management
//!
//! Bindings are kept in binding order. The most recently bound prefix is the
//! one the `:` query shorthand expands to.

use indexmap::IndexMap;
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Ordered prefix bindings
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings, in binding order
    prefixes: IndexMap<String, String>,
}

impl NamespaceManager {
    /// Create a namespace manager with the RDF/RDFS/XSD prefixes bound
    pub fn new() -> Self {
        let mut mgr = Self {
            prefixes: IndexMap::new(),
        };

        mgr.bind("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        mgr.bind("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        mgr.bind("xsd", "http://www.w3.org/2001/XMLSchema#");

        mgr
    }

    /// Bind a prefix. Rebinding an existing prefix moves it to the end.
    pub fn bind(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        let prefix = prefix.into();
        self.prefixes.shift_remove(&prefix);
        self.prefixes.insert(prefix, iri.into());
    }

    /// The most recently bound namespace
    pub fn last_bound(&self) -> Option<Namespace> {
        self.prefixes
            .last()
            .map(|(prefix, iri)| Namespace::new(prefix.clone(), iri.clone()))
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        if let Some((prefix, local)) = compact_iri.split_once(':') {
            let iri = self.get_iri(prefix)?;
            Ok(format!("{}{}", iri, local))
        } else {
            Err(PrefixError::InvalidIri(compact_iri.to_string()))
        }
    }

    /// Compact an IRI using the longest matching bound namespace
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, namespace_iri)| iri.starts_with(namespace_iri.as_str()))
            .max_by_key(|(_, namespace_iri)| namespace_iri.len())
            .map(|(prefix, namespace_iri)| format!("{}:{}", prefix, &iri[namespace_iri.len()..]))
    }

    /// `PREFIX` declarations for every binding, one per line
    pub fn prefix_declarations(&self) -> String {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| format!("PREFIX {}: <{}>\n", prefix, iri))
            .collect()
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefixes() {
        let mgr = NamespaceManager::new();

        assert_eq!(
            mgr.get_iri("rdf").unwrap(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        );
        assert_eq!(mgr.get_iri("xsd").unwrap(), "http://www.w3.org/2001/XMLSchema#");
        assert!(mgr.get_iri("foaf").is_err());
    }

    #[test]
    fn test_last_bound_follows_binding_order() {
        let mut mgr = NamespaceManager::new();
        assert_eq!(mgr.last_bound().unwrap().prefix, "xsd");

        mgr.bind("ns1", "https://data.lacity.org/");
        assert_eq!(
            mgr.last_bound(),
            Some(Namespace::new("ns1", "https://data.lacity.org/"))
        );

        // Rebinding moves the prefix to the end
        mgr.bind("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        assert_eq!(mgr.last_bound().unwrap().prefix, "rdf");
    }

    #[test]
    fn test_expand() {
        let mut mgr = NamespaceManager::new();
        mgr.bind("ns1", "https://data.lacity.org/");

        assert_eq!(mgr.expand("ns1:Person").unwrap(), "https://data.lacity.org/Person");
        assert!(mgr.expand("nope:Person").is_err());
        assert!(mgr.expand("Person").is_err());
    }

    #[test]
    fn test_compact_prefers_longest_namespace() {
        let mut mgr = NamespaceManager::new();
        mgr.bind("ns1", "https://data.lacity.org/");
        mgr.bind("ctx", "https://data.lacity.org/context/");

        assert_eq!(
            mgr.compact("https://data.lacity.org/Person#ab12"),
            Some("ns1:Person#ab12".to_string())
        );
        assert_eq!(
            mgr.compact("https://data.lacity.org/context/crime_reports"),
            Some("ctx:crime_reports".to_string())
        );
        assert_eq!(mgr.compact("http://example.org/x"), None);
    }

    #[test]
    fn test_prefix_declarations() {
        let mut mgr = NamespaceManager::new();
        mgr.bind("ns1", "https://data.lacity.org/");

        let decls = mgr.prefix_declarations();
        assert!(decls.starts_with("PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>\n"));
        assert!(decls.ends_with("PREFIX ns1: <https://data.lacity.org/>\n"));
    }
}
