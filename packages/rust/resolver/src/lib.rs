//! Article acquisition: from a reference to plain body text.
//!
//! This crate provides:
//! - [`PageFetcher`] / [`HttpFetcher`]: single-shot HTTP GET with a timeout
//! - [`extract_paragraph_text`] / [`extract_title`]: HTML to plain text
//! - [`ContentResolver`]: inline text, URL, and stored-id resolution

pub mod extract;
pub mod fetcher;
pub mod resolver;

pub use extract::{extract_paragraph_text, extract_title};
pub use fetcher::{FetchedPage, HttpFetcher, PageFetcher};
pub use resolver::ContentResolver;
