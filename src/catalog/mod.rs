//! Catalog access and aggregation.
//!
//! This module fetches a subject listing from Open Library, enriches each
//! work with rating and author lookups, and merges the results.

pub mod aggregator;
pub mod error;
pub mod source;

pub use aggregator::CatalogAggregator;
pub use error::{CatalogError, LookupError};
pub use source::{
    is_valid_subject, AuthorDoc, CatalogSource, ClientConfig, OpenLibraryClient, WorkDoc,
};
