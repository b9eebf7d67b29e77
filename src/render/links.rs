//! Hyperlinked result rendering
//!
//! Cells holding an IRI become links whose target is a follow-up query for
//! every triple the IRI takes part in.

use super::navigation::NavRequest;
use super::paginate::Page;
use crate::rdf::NamespaceManager;

/// Synthesizes follow-up queries for linked values
pub struct LinkResolver;

impl LinkResolver {
    /// Query for every triple where `value` is the subject, predicate or object
    pub fn follow_up_query(value: &str) -> String {
        let v = format!("<{}>", value);
        format!(
            "SELECT ?s ?p ?o WHERE {{ \
             {{SELECT (COALESCE({v}) AS ?s) ?p ?o WHERE {{{v} ?p ?o}}}} \
             UNION {{SELECT ?s (COALESCE({v}) AS ?p) ?o WHERE {{?s {v} ?o}}}} \
             UNION {{SELECT ?s ?p (COALESCE({v}) AS ?o) WHERE {{?s ?p {v}}}}} }}",
            v = v
        )
    }

    /// Navigation target for following `value`
    pub fn target(value: &str) -> String {
        NavRequest::Query(Self::follow_up_query(value)).to_url()
    }
}

/// One rendered cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    /// Index into [`RenderedPage::links`]
    Link(usize),
}

/// A followable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Full IRI
    pub value: String,
    /// Compacted form shown to the user
    pub display: String,
    /// `nav://query/...` URL
    pub target: String,
}

/// A page with its references resolved to links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub number: usize,
    pub page_count: usize,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub links: Vec<Link>,
}

/// Turns page cells that hold IRIs into links
pub struct HyperlinkRewriter<'a> {
    namespaces: &'a NamespaceManager,
}

impl<'a> HyperlinkRewriter<'a> {
    pub fn new(namespaces: &'a NamespaceManager) -> Self {
        Self { namespaces }
    }

    /// Check if a cell value is followable
    pub fn is_reference(value: &str) -> bool {
        value.starts_with("http://") || value.starts_with("https://")
    }

    /// Display form of an IRI, compacted with the longest bound namespace
    pub fn display(&self, iri: &str) -> String {
        self.namespaces.compact(iri).unwrap_or_else(|| iri.to_string())
    }

    pub fn render(&self, page: &Page, page_count: usize) -> RenderedPage {
        let mut links = Vec::new();
        let rows = page
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| {
                        if Self::is_reference(value) {
                            links.push(Link {
                                value: value.clone(),
                                display: self.display(value),
                                target: LinkResolver::target(value),
                            });
                            Cell::Link(links.len() - 1)
                        } else {
                            Cell::Text(value.clone())
                        }
                    })
                    .collect()
            })
            .collect();

        RenderedPage {
            number: page.number,
            page_count,
            header: page.header.clone(),
            rows,
            links,
        }
    }
}

impl RenderedPage {
    /// HTML table; link cells become anchors, everything else is escaped
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>\n<tr>");
        for label in &self.header {
            html.push_str(&format!("<th>{}</th>", escape_html(label)));
        }
        html.push_str("</tr>\n");

        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                match cell {
                    Cell::Text(text) => html.push_str(&format!("<td>{}</td>", escape_html(text))),
                    Cell::Link(index) => {
                        let link = &self.links[*index];
                        html.push_str(&format!(
                            "<td><a href=\"{}\">{}</a></td>",
                            escape_html(&link.target),
                            escape_html(&link.display)
                        ));
                    }
                }
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");

        if self.page_count > 1 {
            html.push_str("<p>");
            for page in 0..self.page_count {
                if page == self.number {
                    html.push_str(&format!("<b>{}</b> ", page));
                } else {
                    html.push_str(&format!(
                        "<a href=\"{}\">{}</a> ",
                        NavRequest::Page(page).to_url(),
                        page
                    ));
                }
            }
            html.push_str("</p>\n");
        }
        html
    }

    /// Rows for a terminal, links shown as `[n] prefix:local`
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Text(text) => text.clone(),
                        Cell::Link(index) => format!("[{}] {}", index, self.links[*index].display),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaces() -> NamespaceManager {
        let mut mgr = NamespaceManager::new();
        mgr.bind("ns1", "https://data.lacity.org/");
        mgr
    }

    fn page() -> Page {
        Page {
            number: 0,
            header: vec!["?s".to_string(), "?o".to_string()],
            rows: vec![vec![
                "https://data.lacity.org/Person#ab".to_string(),
                "A<B".to_string(),
            ]],
        }
    }

    #[test]
    fn test_follow_up_query_covers_all_positions() {
        let query = LinkResolver::follow_up_query("https://data.lacity.org/Person#ab");
        let v = "<https://data.lacity.org/Person#ab>";

        assert!(query.starts_with("SELECT ?s ?p ?o WHERE {"));
        assert!(query.contains(&format!("(COALESCE({}) AS ?s) ?p ?o WHERE {{{} ?p ?o}}", v, v)));
        assert!(query.contains(&format!("?s (COALESCE({}) AS ?p) ?o WHERE {{?s {} ?o}}", v, v)));
        assert!(query.contains(&format!("?s ?p (COALESCE({}) AS ?o) WHERE {{?s ?p {}}}", v, v)));
        assert_eq!(query.matches("UNION").count(), 2);
    }

    #[test]
    fn test_is_reference() {
        assert!(HyperlinkRewriter::is_reference("http://x"));
        assert!(HyperlinkRewriter::is_reference("https://data.lacity.org/Report#1"));
        assert!(!HyperlinkRewriter::is_reference("77TH STREET"));
        assert!(!HyperlinkRewriter::is_reference("ftp://x"));
    }

    #[test]
    fn test_render_links_and_escapes() {
        let ns = namespaces();
        let rendered = HyperlinkRewriter::new(&ns).render(&page(), 1);

        assert_eq!(rendered.rows[0], vec![Cell::Link(0), Cell::Text("A<B".to_string())]);
        assert_eq!(rendered.links[0].display, "ns1:Person#ab");
        assert!(rendered.links[0].target.starts_with("nav://query/"));

        let html = rendered.to_html();
        assert!(html.contains("<th>?s</th>"));
        assert!(html.contains(">ns1:Person#ab</a>"));
        assert!(html.contains("<td>A&lt;B</td>"));
        assert!(!html.contains("nav://page/"));

        assert_eq!(rendered.text_rows()[0], vec!["[0] ns1:Person#ab", "A<B"]);
    }

    #[test]
    fn test_html_page_links() {
        let ns = namespaces();
        let mut second = page();
        second.number = 1;
        let html = HyperlinkRewriter::new(&ns).render(&second, 3).to_html();

        assert!(html.contains("<a href=\"nav://page/0\">0</a>"));
        assert!(html.contains("<b>1</b>"));
        assert!(html.contains("<a href=\"nav://page/2\">2</a>"));
    }
}
