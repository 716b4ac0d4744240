//! Core types for the bazaar search layer
//!
//! This crate provides the foundational abstractions shared across the
//! search subsystem:
//!
//! - **Models**: search documents, result pages, suggestions, facets
//! - **Configuration**: layered configuration management
//! - **Error handling**: unified error types

pub mod config;
pub mod error;
pub mod models;

// Re-export main types for convenience
pub use config::{Config, SearchConfig};
pub use error::{Error, Result, ResultExt};
pub use models::{
    CategorySuggestion, FacetCount, FacetedSearchRequest, SearchDocument, SearchPage, SortOption,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
