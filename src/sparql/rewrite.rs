//! Query text rewriting

use crate::rdf::NamespaceManager;

/// Rewrites query text before it is parsed
pub trait QueryRewriter {
    fn rewrite(&self, query: &str, namespaces: &NamespaceManager) -> String;
}

/// Expands the `:` shorthand to the most recently bound prefix.
///
/// The rewrite is purely textual: every colon becomes `prefix:`, including
/// colons inside IRIs and string literals. Queries that spell out full IRIs
/// should go through [`Verbatim`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShorthandPrefix;

impl QueryRewriter for ShorthandPrefix {
    fn rewrite(&self, query: &str, namespaces: &NamespaceManager) -> String {
        match namespaces.last_bound() {
            Some(ns) => query.replace(':', &format!("{}:", ns.prefix)),
            None => query.to_string(),
        }
    }
}

/// Leaves query text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl QueryRewriter for Verbatim {
    fn rewrite(&self, query: &str, _namespaces: &NamespaceManager) -> String {
        query.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaces() -> NamespaceManager {
        let mut mgr = NamespaceManager::new();
        mgr.bind("ns1", "https://data.lacity.org/");
        mgr
    }

    #[test]
    fn test_shorthand_uses_last_bound_prefix() {
        let text = ShorthandPrefix.rewrite("SELECT ?r WHERE { ?r a :Report }", &namespaces());
        assert_eq!(text, "SELECT ?r WHERE { ?r a ns1:Report }");
    }

    #[test]
    fn test_shorthand_rewrites_every_colon() {
        let text = ShorthandPrefix.rewrite("<http://x/> \"a:b\"", &namespaces());
        assert_eq!(text, "<httpns1://x/> \"ans1:b\"");
    }

    #[test]
    fn test_verbatim() {
        let query = "SELECT * WHERE { <https://data.lacity.org/Report#1> ?p ?o }";
        assert_eq!(Verbatim.rewrite(query, &namespaces()), query);
    }
}
