//! Search client layer for the bazaar storefront
//!
//! This crate wraps the Typesense HTTP API behind collection-bound
//! clients with bounded retry, typeahead debouncing, structured query
//! construction, and tolerant response shaping. Failures degrade to
//! empty results by policy; nothing here throws past a public method.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod client;
mod debounce;
pub mod error;
mod mock;
pub mod query;
mod registry;
mod response;
mod retry;
mod transport;

pub use client::{
    SearchClient, CATEGORY_QUERY_BY, DEFAULT_HITS_PER_PAGE, ORDER_QUERY_BY, SHOP_QUERY_BY,
    SPEC_FACET_FIELDS,
};
pub use debounce::Debouncer;
pub use error::SearchError;
pub use mock::{MockTransport, RecordedRequest};
pub use query::{SearchParams, DEFAULT_PRODUCT_QUERY_BY};
pub use registry::SearchServices;
pub use response::{strip_collection_prefix, total_pages, MAX_PAGES};
pub use retry::with_retry;
pub use transport::{HttpTransport, SearchTransport, TransportResponse};
