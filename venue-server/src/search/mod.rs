//! Catalog search
//!
//! Fuzzy text search and faceted filtering over songs and products, with a
//! uniform `{items, total, page, pages}` envelope.

pub mod score;
pub mod service;

pub use service::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, SearchPage, SearchService, clamp_limit};
