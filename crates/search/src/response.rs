//! Normalization of raw Typesense responses into typed results
//!
//! Parsing is tolerant by policy: a malformed hit degrades to a minimal
//! document, a malformed body degrades to an empty result. Search is a
//! best-effort enhancement and must never fail a caller over a bad
//! payload.

use crate::error::SearchError;
use crate::transport::TransportResponse;
use bazaar_core::models::{FacetCount, SearchDocument, SearchPage};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Sanity ceiling for the computed total page count
pub const MAX_PAGES: usize = 9_999;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearchResponse {
    #[serde(default)]
    pub found: u64,
    #[serde(default)]
    pub hits: Vec<RawHit>,
    #[serde(default)]
    pub facet_counts: Vec<RawFacetField>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawHit {
    #[serde(default)]
    pub document: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFacetField {
    pub field_name: String,
    #[serde(default)]
    pub counts: Vec<RawFacetValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFacetValue {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub count: i64,
}

/// Strip the engine's `{collection}_` prefix to recover the origin
/// database identifier; IDs without the prefix pass through unchanged.
pub fn strip_collection_prefix(id: &str, collection: &str) -> String {
    let prefix = format!("{collection}_");
    match id.strip_prefix(&prefix) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => id.to_string(),
    }
}

/// Total page count: `ceil(found / per_page)`, at least 1, capped at
/// [`MAX_PAGES`] to guard against pathological inputs.
pub fn total_pages(found: u64, per_page: usize) -> usize {
    if per_page == 0 {
        return 1;
    }
    let pages = found.div_ceil(per_page as u64);
    (pages.min(MAX_PAGES as u64) as usize).max(1)
}

/// Stringify a raw `id` field whatever its JSON type
fn coerce_id(value: &Value) -> String {
    match value.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse one hit document. Fields the typed model does not understand
/// land in `extra`, a wrong-typed field defaults without failing the
/// rest of the hit, and a document whose shape defeats the model
/// entirely still yields its id. Documents without an id are dropped.
pub(crate) fn parse_document(value: &Value, collection: &str) -> Option<SearchDocument> {
    let raw_id = coerce_id(value);
    if raw_id.is_empty() {
        return None;
    }
    let id = strip_collection_prefix(&raw_id, collection);

    let mut doc: SearchDocument =
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Dropping malformed fields of search hit {raw_id}: {e}");
            SearchDocument::default()
        });
    doc.id = id.clone();
    doc.object_id = id;
    Some(doc)
}

pub(crate) fn parse_body(body: &str) -> Result<RawSearchResponse, SearchError> {
    serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))
}

/// Normalize a response into an ordered document list.
///
/// Non-success statuses below 500 yield an empty list by policy (5xx is
/// handled upstream by the retry helper).
pub(crate) fn documents_from_response(
    response: &TransportResponse,
    collection: &str,
) -> Vec<SearchDocument> {
    let raw = match success_body(response) {
        Some(raw) => raw,
        None => return Vec::new(),
    };
    raw.hits
        .iter()
        .filter_map(|hit| parse_document(&hit.document, collection))
        .collect()
}

/// Normalize a response into a full [`SearchPage`] for the 0-indexed
/// `page` the caller requested.
pub(crate) fn page_from_response(
    response: &TransportResponse,
    collection: &str,
    page: usize,
    per_page: usize,
) -> SearchPage {
    let raw = match success_body(response) {
        Some(raw) => raw,
        None => return SearchPage::empty(page),
    };
    let hits: Vec<SearchDocument> = raw
        .hits
        .iter()
        .filter_map(|hit| parse_document(&hit.document, collection))
        .collect();
    let ids = hits.iter().map(|h| h.id.clone()).collect();
    SearchPage {
        ids,
        hits,
        page,
        nb_pages: total_pages(raw.found, per_page),
    }
}

/// Normalize a facet-only response into per-field value counts,
/// dropping values with non-positive counts.
pub(crate) fn facets_from_response(
    response: &TransportResponse,
) -> HashMap<String, Vec<FacetCount>> {
    let raw = match success_body(response) {
        Some(raw) => raw,
        None => return HashMap::new(),
    };
    raw.facet_counts
        .into_iter()
        .map(|field| {
            let counts = field
                .counts
                .into_iter()
                .filter(|c| c.count > 0)
                .map(|c| FacetCount {
                    value: c.value,
                    count: c.count as u64,
                })
                .collect();
            (field.field_name, counts)
        })
        .collect()
}

/// Parse the body of a successful response; any non-success status or
/// unparseable body degrades to `None` (logged).
fn success_body(response: &TransportResponse) -> Option<RawSearchResponse> {
    if !response.is_success() {
        warn!(
            "Search engine returned status {}, treating as empty result",
            response.status
        );
        return None;
    }
    match parse_body(&response.body) {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!("Unparseable search response, treating as empty result: {e}");
            None
        }
    }
}
