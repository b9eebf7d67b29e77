//! Result presentation
//!
//! Query rows are split into fixed-size pages, IRIs in a page become links
//! to follow-up queries, and navigation requests move between pages or
//! follow those links.

mod links;
mod navigation;
mod paginate;

pub use links::{escape_html, Cell, HyperlinkRewriter, Link, LinkResolver, RenderedPage};

pub use navigation::{NavError, NavRequest, NavResponse, NavResult, TEXT_HTML, TEXT_PLAIN};

pub use paginate::{paginate, result_header, Page, DEFAULT_PAGE_SIZE};
