//! Fetch collaborator services

pub mod http_source;
pub mod page_parser;

pub use http_source::{HttpArticleSource, HttpSourceConfig};
pub use page_parser::{is_likely_recipe, parse_article, parse_index_links};
