//! Navigation protocol
//!
//! `nav://page/<n>` re-renders page `n` of the current result;
//! `nav://query/<percent-encoded query>` runs a derived query. Every request
//! gets a response carrying a payload and its content type.

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use thiserror::Error;

const SCHEME: &str = "nav://";

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";

/// Navigation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// Not a `nav://page/` or `nav://query/` URL
    #[error("Unsupported navigation target: {0}")]
    UnknownTarget(String),

    /// Page number is not a non-negative integer
    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    /// Query is not valid percent-encoded UTF-8
    #[error("Invalid query encoding: {0}")]
    Decode(String),

    /// Page beyond the current result
    #[error("Page {page} out of range ({pages} pages)")]
    PageOutOfRange { page: usize, pages: usize },

    /// Page requested before any query ran
    #[error("No current result")]
    NoResult,
}

pub type NavResult<T> = Result<T, NavError>;

/// A navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    Page(usize),
    Query(String),
}

impl NavRequest {
    pub fn parse(url: &str) -> NavResult<Self> {
        let rest = url
            .strip_prefix(SCHEME)
            .ok_or_else(|| NavError::UnknownTarget(url.to_string()))?;

        if let Some(page) = rest.strip_prefix("page") {
            let page = page.strip_prefix('/').unwrap_or(page);
            if page.is_empty() {
                return Ok(NavRequest::Page(0));
            }
            return page
                .parse()
                .map(NavRequest::Page)
                .map_err(|_| NavError::InvalidPage(page.to_string()));
        }

        if let Some(encoded) = rest.strip_prefix("query/") {
            let query = percent_decode_str(encoded)
                .decode_utf8()
                .map_err(|e| NavError::Decode(e.to_string()))?;
            return Ok(NavRequest::Query(query.into_owned()));
        }

        Err(NavError::UnknownTarget(url.to_string()))
    }

    pub fn to_url(&self) -> String {
        match self {
            NavRequest::Page(page) => format!("{}page/{}", SCHEME, page),
            NavRequest::Query(query) => format!(
                "{}query/{}",
                SCHEME,
                utf8_percent_encode(query, NON_ALPHANUMERIC)
            ),
        }
    }
}

/// A navigation response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavResponse {
    pub payload: String,
    pub content_type: &'static str,
}

impl NavResponse {
    pub fn html(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            content_type: TEXT_HTML,
        }
    }

    pub fn plain(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            content_type: TEXT_PLAIN,
        }
    }

    pub fn is_html(&self) -> bool {
        self.content_type == TEXT_HTML
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page() {
        assert_eq!(NavRequest::parse("nav://page/3").unwrap(), NavRequest::Page(3));
        assert_eq!(NavRequest::parse("nav://page/").unwrap(), NavRequest::Page(0));
        assert_eq!(NavRequest::parse("nav://page").unwrap(), NavRequest::Page(0));
        assert!(matches!(
            NavRequest::parse("nav://page/-1"),
            Err(NavError::InvalidPage(_))
        ));
    }

    #[test]
    fn test_query_url_round_trip() {
        let query = "SELECT ?s WHERE { <https://data.lacity.org/Report#1> ?p ?s }";
        let url = NavRequest::Query(query.to_string()).to_url();

        assert!(url.starts_with("nav://query/"));
        assert!(!url.contains(' '));
        assert_eq!(NavRequest::parse(&url).unwrap(), NavRequest::Query(query.to_string()));
    }

    #[test]
    fn test_unknown_targets() {
        assert!(matches!(
            NavRequest::parse("https://data.lacity.org/"),
            Err(NavError::UnknownTarget(_))
        ));
        assert!(matches!(
            NavRequest::parse("nav://elsewhere/1"),
            Err(NavError::UnknownTarget(_))
        ));
        assert!(matches!(
            NavRequest::parse("nav://query/%FF"),
            Err(NavError::Decode(_))
        ));
    }

    #[test]
    fn test_response_content_types() {
        assert!(NavResponse::html("<table></table>").is_html());
        assert_eq!(NavResponse::plain("error").content_type, "text/plain");
    }
}
