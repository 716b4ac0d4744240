//! Request and response models for search operations
//!
//! These types form the public contract between the search client layer
//! and the rest of the application. Documents are parsed tolerantly:
//! every catalog field is optional and a missing or malformed field never
//! fails the surrounding document.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize a field tolerantly: a value of the wrong type becomes
/// `None` instead of failing the surrounding document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Tolerant list field: anything that is not a string array becomes empty.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Tolerant id field: numbers are stringified, everything else that is
/// not a string becomes empty.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// A normalized document returned from a search query.
///
/// `id` is the origin-database identifier (engine collection prefix
/// stripped) and is always non-empty after parsing. `object_id` is kept
/// equal to `id` for compatibility with search-UI conventions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_id", rename = "objectID")]
    pub object_id: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_ku: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,

    /// Category hierarchy keys (language neutral)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subsubcategory: Option<String>,

    /// Localized category display names
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub category_name_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub category_name_ku: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subcategory_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subcategory_name_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subcategory_name_ku: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subsubcategory_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subsubcategory_name_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subsubcategory_name_ku: Option<String>,

    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_boosted: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub promotion_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub stock_count: Option<i64>,

    /// Order-specific fields
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,

    /// Fields the catalog schema knows about but this model does not
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a paginated, faceted query.
///
/// `ids` and `hits` have the same length and preserve the relevance
/// ranking order returned by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub ids: Vec<String>,
    pub hits: Vec<SearchDocument>,
    /// Zero-based page index that was requested
    pub page: usize,
    /// Total page count, clamped to 1..=9999
    pub nb_pages: usize,
}

impl SearchPage {
    /// An empty page preserving the requested page index
    pub fn empty(page: usize) -> Self {
        Self {
            ids: Vec::new(),
            hits: Vec::new(),
            page,
            nb_pages: 1,
        }
    }
}

/// A deduplicated category suggestion for autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category_key: String,
    pub subcategory_key: Option<String>,
    pub subsubcategory_key: Option<String>,
    /// Localized hierarchical display name, e.g. "Electronics > Phones"
    pub display_name: String,
    /// 0 = category, 1 = subcategory, 2 = sub-subcategory
    pub level: u8,
    pub language: String,
}

/// One value of a faceted field and its occurrence count within the
/// current filtered result set. Only values with `count > 0` are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Sort-option tokens accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Promotion score then recency; the platform default ordering
    #[default]
    Relevance,
    Date,
    Alphabetical,
    PriceAsc,
    PriceDesc,
    Timestamp,
}

impl SortOption {
    /// Parse a caller-supplied token; unrecognized tokens map to the
    /// default relevance ordering.
    pub fn from_token(token: &str) -> Self {
        match token {
            "date" => Self::Date,
            "alphabetical" => Self::Alphabetical,
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "timestamp" => Self::Timestamp,
            _ => Self::Relevance,
        }
    }
}

/// Parameters for the general faceted paginated query.
#[derive(Debug, Clone, Default)]
pub struct FacetedSearchRequest {
    /// Collection to query; the client's bound collection when `None`
    pub index_name: Option<String>,
    pub query: Option<String>,
    /// Zero-based page index
    pub page: usize,
    pub hits_per_page: usize,
    /// OR within a group, AND across groups; entries are `field:value`
    pub facet_filters: Vec<Vec<String>>,
    /// Entries of shape `"field op value"` with op in >=, <=, >, <, =
    pub numeric_filters: Vec<String>,
    pub sort_option: Option<SortOption>,
    /// Pre-built filter expression AND-ed with the generated clauses
    pub additional_filter_by: Option<String>,
    pub query_by: Option<String>,
    /// Explicit projection to minimize payload size
    pub include_fields: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sort_option_tokens() {
        assert_eq!(SortOption::from_token("date"), SortOption::Date);
        assert_eq!(SortOption::from_token("price_asc"), SortOption::PriceAsc);
        assert_eq!(SortOption::from_token("newest"), SortOption::Relevance);
        assert_eq!(SortOption::from_token(""), SortOption::Relevance);
    }

    #[test]
    fn document_tolerates_unknown_fields() {
        let doc: SearchDocument = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "objectID": "abc",
            "name": "Phone",
            "warehouse_zone": "B2",
        }))
        .unwrap();
        assert_eq!(doc.id, "abc");
        assert_eq!(doc.name.as_deref(), Some("Phone"));
        assert!(doc.extra.contains_key("warehouse_zone"));
    }

    #[test]
    fn wrong_typed_field_defaults_without_losing_the_rest() {
        let doc: SearchDocument = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "name": "Phone One",
            "price": 199.0,
            "stock_count": 3.5,
            "images": "not-a-list",
        }))
        .unwrap();
        assert_eq!(doc.name.as_deref(), Some("Phone One"));
        assert_eq!(doc.price, Some(199.0));
        assert_eq!(doc.stock_count, None);
        assert!(doc.images.is_empty());
    }

    #[test]
    fn empty_page_has_one_page() {
        let page = SearchPage::empty(4);
        assert_eq!(page.page, 4);
        assert_eq!(page.nb_pages, 1);
        assert!(page.ids.is_empty());
    }
}
