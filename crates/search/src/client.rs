//! Collection-bound search client
//!
//! A `SearchClient` binds one host/key/collection tuple and exposes the
//! collection-aware search operations. Every public method retries
//! transient failures with bounded backoff and degrades to an empty
//! result on any remaining failure; search is a best-effort enhancement
//! and never crashes a caller.

use crate::debounce::Debouncer;
use crate::error::SearchError;
use crate::query::{self, SearchParams, DEFAULT_PRODUCT_QUERY_BY};
use crate::response;
use crate::retry::with_retry;
use crate::transport::{SearchTransport, TransportResponse};
use bazaar_core::config::SearchConfig;
use bazaar_core::models::{
    CategorySuggestion, FacetCount, FacetedSearchRequest, SearchDocument, SearchPage, SortOption,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Field list for shop directory queries
pub const SHOP_QUERY_BY: &str = "name,name_ar,name_ku,keywords";

/// Field list for order queries
pub const ORDER_QUERY_BY: &str = "product_name,shop_name,order_number";

/// Field list for category autocomplete queries
pub const CATEGORY_QUERY_BY: &str = "category_name,category_name_ar,category_name_ku,\
subcategory_name,subcategory_name_ar,subcategory_name_ku,\
subsubcategory_name,subsubcategory_name_ar,subsubcategory_name_ku";

/// Projection used for category autocomplete to keep payloads small
const CATEGORY_INCLUDE_FIELDS: &str = "id,category,subcategory,subsubcategory,\
category_name,category_name_ar,category_name_ku,\
subcategory_name,subcategory_name_ar,subcategory_name_ku,\
subsubcategory_name,subsubcategory_name_ar,subsubcategory_name_ku";

/// Product-specification fields aggregated for the filter sidebar
pub const SPEC_FACET_FIELDS: &str = "type,brand,material,size";

/// Default caps for category suggestions
const DEFAULT_CATEGORY_LIMIT: usize = 5;
const DEFAULT_ENHANCED_CATEGORY_LIMIT: usize = 15;

/// How many documents to pull when building category suggestions; more
/// than the cap because suggestions are deduplicated across hits
const CATEGORY_FETCH_SIZE: usize = 50;

/// Default page size for product and shop queries
pub const DEFAULT_HITS_PER_PAGE: usize = 20;

/// Per-collection search client.
pub struct SearchClient {
    transport: Arc<dyn SearchTransport>,
    collection: String,
    config: SearchConfig,
    products_debouncer: Debouncer<Vec<SearchDocument>>,
    categories_debouncer: Debouncer<Vec<CategorySuggestion>>,
}

impl SearchClient {
    /// Create a client bound to `collection`, issuing requests through
    /// the given transport.
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        collection: impl Into<String>,
        config: SearchConfig,
    ) -> Self {
        let collection = collection.into();
        info!("Initializing search client for collection {collection}");
        let window = Duration::from_millis(config.debounce_ms);
        Self {
            transport,
            collection,
            config,
            products_debouncer: Debouncer::new(window),
            categories_debouncer: Debouncer::new(window),
        }
    }

    /// Collection this client is bound to
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    fn category_timeout(&self) -> Duration {
        Duration::from_millis(self.config.category_timeout_ms)
    }

    fn order_timeout(&self) -> Duration {
        Duration::from_millis(self.config.order_timeout_ms)
    }

    /// Issue one request with retry. A 5xx status is reported as a
    /// retryable error; everything else is returned for the normalizer
    /// to shape (non-success below 500 degrades to empty by policy).
    async fn execute(
        transport: Arc<dyn SearchTransport>,
        config: &SearchConfig,
        collection: String,
        params: SearchParams,
        timeout: Duration,
    ) -> Result<TransportResponse, SearchError> {
        with_retry(
            || {
                let transport = Arc::clone(&transport);
                let collection = collection.clone();
                let params = params.clone();
                async move {
                    let response = transport.search(&collection, &params, timeout).await?;
                    if response.status >= 500 {
                        return Err(SearchError::Status {
                            status: response.status,
                            body: response.body,
                        });
                    }
                    Ok(response)
                }
            },
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        )
        .await
    }

    /// Run a query and shape the hits into a document list, degrading
    /// to empty on any failure.
    async fn fetch_documents(
        transport: Arc<dyn SearchTransport>,
        config: SearchConfig,
        collection: String,
        params: SearchParams,
        timeout: Duration,
        operation: &'static str,
    ) -> Vec<SearchDocument> {
        match Self::execute(transport, &config, collection.clone(), params, timeout).await {
            Ok(response) => response::documents_from_response(&response, &collection),
            Err(e) => {
                warn!("{operation} degraded to empty result: {e}");
                Vec::new()
            }
        }
    }

    /// General catalog search against the client's bound collection.
    pub async fn search_products(
        &self,
        query: &str,
        sort: SortOption,
        page: usize,
        hits_per_page: usize,
        filters: &[String],
    ) -> Vec<SearchDocument> {
        let params = self.product_params(query, sort, page, hits_per_page, filters);
        Self::fetch_documents(
            Arc::clone(&self.transport),
            self.config.clone(),
            self.collection.clone(),
            params,
            self.default_timeout(),
            "search_products",
        )
        .await
    }

    /// Identical to [`search_products`](Self::search_products) but
    /// coalesced through the debounce window; only the most recent call
    /// of a burst executes and every caller shares its result.
    pub async fn debounced_search_products(
        &self,
        query: &str,
        sort: SortOption,
        page: usize,
        hits_per_page: usize,
        filters: &[String],
    ) -> Vec<SearchDocument> {
        let params = self.product_params(query, sort, page, hits_per_page, filters);
        let transport = Arc::clone(&self.transport);
        let config = self.config.clone();
        let collection = self.collection.clone();
        let timeout = self.default_timeout();
        self.products_debouncer
            .call(async move {
                Self::fetch_documents(
                    transport,
                    config,
                    collection,
                    params,
                    timeout,
                    "debounced_search_products",
                )
                .await
            })
            .await
            .unwrap_or_default()
    }

    fn product_params(
        &self,
        query: &str,
        sort: SortOption,
        page: usize,
        hits_per_page: usize,
        filters: &[String],
    ) -> SearchParams {
        let filter = query::combine_filters(filters.iter().filter_map(|f| query::equality_filter(f)));
        SearchParams::for_page(query, DEFAULT_PRODUCT_QUERY_BY, page, hits_per_page)
            .with_sort(sort)
            .with_filter(filter)
    }

    /// Search scoped to one shop's catalog. Always targets the
    /// shop-products collection and always injects the shop filter.
    pub async fn search_shop_products(
        &self,
        shop_id: &str,
        query: &str,
        sort: SortOption,
        page: usize,
        hits_per_page: usize,
        additional_filters: &[String],
    ) -> Vec<SearchDocument> {
        let mut clauses = vec![format!("shop_id:={shop_id}")];
        clauses.extend(
            additional_filters
                .iter()
                .filter_map(|f| query::equality_filter(f)),
        );
        let params = SearchParams::for_page(query, DEFAULT_PRODUCT_QUERY_BY, page, hits_per_page)
            .with_sort(sort)
            .with_filter(query::combine_filters(clauses));
        Self::fetch_documents(
            Arc::clone(&self.transport),
            self.config.clone(),
            self.config.shop_products_collection.clone(),
            params,
            self.default_timeout(),
            "search_shop_products",
        )
        .await
    }

    /// Directory search over shop profiles.
    pub async fn search_shops(
        &self,
        query: &str,
        page: usize,
        hits_per_page: usize,
    ) -> Vec<SearchDocument> {
        let params = SearchParams::for_page(query, SHOP_QUERY_BY, page, hits_per_page);
        Self::fetch_documents(
            Arc::clone(&self.transport),
            self.config.clone(),
            self.config.shops_collection.clone(),
            params,
            self.default_timeout(),
            "search_shops",
        )
        .await
    }

    /// Order search scoped to the buyer or seller role of one user.
    pub async fn search_orders(
        &self,
        query: &str,
        user_id: &str,
        is_sold: bool,
        page: usize,
        hits_per_page: usize,
    ) -> Vec<SearchDocument> {
        let role_field = if is_sold { "seller_id" } else { "buyer_id" };
        let params = SearchParams::for_page(query, ORDER_QUERY_BY, page, hits_per_page)
            .with_sort(SortOption::Date)
            .with_filter(Some(format!("{role_field}:={user_id}")));
        Self::fetch_documents(
            Arc::clone(&self.transport),
            self.config.clone(),
            self.config.orders_collection.clone(),
            params,
            self.order_timeout(),
            "search_orders",
        )
        .await
    }

    /// Order search scoped to a shop.
    pub async fn search_orders_by_shop(
        &self,
        query: &str,
        shop_id: &str,
        page: usize,
        hits_per_page: usize,
    ) -> Vec<SearchDocument> {
        let params = SearchParams::for_page(query, ORDER_QUERY_BY, page, hits_per_page)
            .with_sort(SortOption::Date)
            .with_filter(Some(format!("shop_id:={shop_id}")));
        Self::fetch_documents(
            Arc::clone(&self.transport),
            self.config.clone(),
            self.config.orders_collection.clone(),
            params,
            self.order_timeout(),
            "search_orders_by_shop",
        )
        .await
    }

    /// General faceted, paginated query returning a full [`SearchPage`].
    pub async fn search_ids_with_facets(&self, request: FacetedSearchRequest) -> SearchPage {
        let collection = request
            .index_name
            .clone()
            .unwrap_or_else(|| self.collection.clone());
        let query_by = request
            .query_by
            .clone()
            .unwrap_or_else(|| DEFAULT_PRODUCT_QUERY_BY.to_string());
        let hits_per_page = if request.hits_per_page == 0 {
            DEFAULT_HITS_PER_PAGE
        } else {
            request.hits_per_page
        };
        let filter = query::build_filter_by(
            request.additional_filter_by.as_deref(),
            &request.facet_filters,
            &request.numeric_filters,
        );
        let params = SearchParams::for_page(
            request.query.as_deref().unwrap_or(""),
            &query_by,
            request.page,
            hits_per_page,
        )
        .with_sort(request.sort_option.unwrap_or_default())
        .with_filter(filter)
        .with_include_fields(request.include_fields.clone());

        match Self::execute(
            Arc::clone(&self.transport),
            &self.config,
            collection.clone(),
            params,
            self.default_timeout(),
        )
        .await
        {
            Ok(response) => {
                response::page_from_response(&response, &collection, request.page, hits_per_page)
            }
            Err(e) => {
                warn!("search_ids_with_facets degraded to empty page: {e}");
                SearchPage::empty(request.page)
            }
        }
    }

    /// Autocomplete over category names in the given language, English
    /// fallback when the localized field is absent. Deduplicated by key
    /// tuple, most-specific-first, capped at `limit`.
    pub async fn search_categories(
        &self,
        query: &str,
        limit: Option<usize>,
        language: &str,
    ) -> Vec<CategorySuggestion> {
        let limit = limit.unwrap_or(DEFAULT_CATEGORY_LIMIT);
        self.fetch_category_suggestions(query, limit, language, "search_categories")
            .await
    }

    /// Same semantics as [`search_categories`](Self::search_categories)
    /// with a higher default cap.
    pub async fn search_categories_enhanced(
        &self,
        query: &str,
        limit: Option<usize>,
        language: &str,
    ) -> Vec<CategorySuggestion> {
        let limit = limit.unwrap_or(DEFAULT_ENHANCED_CATEGORY_LIMIT);
        self.fetch_category_suggestions(query, limit, language, "search_categories_enhanced")
            .await
    }

    /// Debounced variant of the enhanced category autocomplete.
    pub async fn debounced_search_categories(
        &self,
        query: &str,
        limit: Option<usize>,
        language: &str,
    ) -> Vec<CategorySuggestion> {
        let limit = limit.unwrap_or(DEFAULT_ENHANCED_CATEGORY_LIMIT);
        let transport = Arc::clone(&self.transport);
        let config = self.config.clone();
        let collection = self.collection.clone();
        let params = Self::category_params(query);
        let timeout = self.category_timeout();
        let language = language.to_string();
        self.categories_debouncer
            .call(async move {
                let docs = Self::fetch_documents(
                    transport,
                    config,
                    collection,
                    params,
                    timeout,
                    "debounced_search_categories",
                )
                .await;
                build_category_suggestions(&docs, &language, limit)
            })
            .await
            .unwrap_or_default()
    }

    async fn fetch_category_suggestions(
        &self,
        query: &str,
        limit: usize,
        language: &str,
        operation: &'static str,
    ) -> Vec<CategorySuggestion> {
        let docs = Self::fetch_documents(
            Arc::clone(&self.transport),
            self.config.clone(),
            self.collection.clone(),
            Self::category_params(query),
            self.category_timeout(),
            operation,
        )
        .await;
        build_category_suggestions(&docs, language, limit)
    }

    fn category_params(query: &str) -> SearchParams {
        SearchParams::for_page(query, CATEGORY_QUERY_BY, 0, CATEGORY_FETCH_SIZE)
            .with_include_fields(Some(CATEGORY_INCLUDE_FIELDS.to_string()))
    }

    /// Zero-hit aggregation returning facet counts for the fixed
    /// product-specification fields. Zero and negative counts are
    /// discarded.
    pub async fn fetch_spec_facets(
        &self,
        index_name: Option<&str>,
        query: &str,
        facet_filters: &[Vec<String>],
        additional_filter_by: Option<&str>,
    ) -> HashMap<String, Vec<FacetCount>> {
        let collection = index_name.unwrap_or(&self.collection).to_string();
        let filter = query::build_filter_by(additional_filter_by, facet_filters, &[]);
        // per_page 0: counts only, no documents in the payload
        let params = SearchParams::for_page(query, DEFAULT_PRODUCT_QUERY_BY, 0, 0)
            .with_filter(filter)
            .with_facets(SPEC_FACET_FIELDS, 100);

        match Self::execute(
            Arc::clone(&self.transport),
            &self.config,
            collection,
            params,
            self.default_timeout(),
        )
        .await
        {
            Ok(response) => response::facets_from_response(&response),
            Err(e) => {
                warn!("fetch_spec_facets degraded to empty result: {e}");
                HashMap::new()
            }
        }
    }

    /// Lightweight reachability probe: one-result wildcard query,
    /// reachable iff the engine answers with a status below 500.
    pub async fn is_service_reachable(&self) -> bool {
        let params = SearchParams::for_page("*", "name", 0, 1);
        match Self::execute(
            Arc::clone(&self.transport),
            &self.config,
            self.collection.clone(),
            params,
            self.default_timeout(),
        )
        .await
        {
            Ok(response) => response.status < 500,
            Err(e) => {
                warn!("Reachability probe failed for {}: {e}", self.collection);
                false
            }
        }
    }
}

/// Pick the localized value for a language code, falling back to the
/// English field when the localized one is absent or empty.
fn localized<'a>(
    english: Option<&'a str>,
    arabic: Option<&'a str>,
    kurdish: Option<&'a str>,
    language: &str,
) -> Option<&'a str> {
    let preferred = match language {
        "ar" => arabic,
        "ku" => kurdish,
        _ => english,
    };
    preferred.filter(|s| !s.is_empty()).or(english).filter(|s| !s.is_empty())
}

/// Build deduplicated suggestions from catalog documents. Suggestions
/// are unique by their key tuple, deeper levels require non-empty
/// ancestors, and the result is ordered most-specific-first.
fn build_category_suggestions(
    docs: &[SearchDocument],
    language: &str,
    limit: usize,
) -> Vec<CategorySuggestion> {
    let mut seen: HashSet<(String, Option<String>, Option<String>)> = HashSet::new();
    let mut suggestions = Vec::new();

    for doc in docs {
        let cat_key = match doc.category.as_deref().filter(|c| !c.is_empty()) {
            Some(key) => key,
            None => continue,
        };
        let cat_name = localized(
            doc.category_name.as_deref(),
            doc.category_name_ar.as_deref(),
            doc.category_name_ku.as_deref(),
            language,
        )
        .unwrap_or(cat_key);

        if seen.insert((cat_key.to_string(), None, None)) {
            suggestions.push(CategorySuggestion {
                category_key: cat_key.to_string(),
                subcategory_key: None,
                subsubcategory_key: None,
                display_name: cat_name.to_string(),
                level: 0,
                language: language.to_string(),
            });
        }

        let sub_key = match doc.subcategory.as_deref().filter(|c| !c.is_empty()) {
            Some(key) => key,
            None => continue,
        };
        let sub_name = localized(
            doc.subcategory_name.as_deref(),
            doc.subcategory_name_ar.as_deref(),
            doc.subcategory_name_ku.as_deref(),
            language,
        )
        .unwrap_or(sub_key);

        if seen.insert((cat_key.to_string(), Some(sub_key.to_string()), None)) {
            suggestions.push(CategorySuggestion {
                category_key: cat_key.to_string(),
                subcategory_key: Some(sub_key.to_string()),
                subsubcategory_key: None,
                display_name: format!("{cat_name} > {sub_name}"),
                level: 1,
                language: language.to_string(),
            });
        }

        let subsub_key = match doc.subsubcategory.as_deref().filter(|c| !c.is_empty()) {
            Some(key) => key,
            None => continue,
        };
        let subsub_name = localized(
            doc.subsubcategory_name.as_deref(),
            doc.subsubcategory_name_ar.as_deref(),
            doc.subsubcategory_name_ku.as_deref(),
            language,
        )
        .unwrap_or(subsub_key);

        if seen.insert((
            cat_key.to_string(),
            Some(sub_key.to_string()),
            Some(subsub_key.to_string()),
        )) {
            suggestions.push(CategorySuggestion {
                category_key: cat_key.to_string(),
                subcategory_key: Some(sub_key.to_string()),
                subsubcategory_key: Some(subsub_key.to_string()),
                display_name: format!("{cat_name} > {sub_name} > {subsub_name}"),
                level: 2,
                language: language.to_string(),
            });
        }
    }

    // Most specific suggestions first; stable so engine relevance order
    // is preserved within a level.
    suggestions.sort_by(|a, b| b.level.cmp(&a.level));
    suggestions.truncate(limit);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(cat: &str, sub: Option<&str>, subsub: Option<&str>) -> SearchDocument {
        SearchDocument {
            id: "x".to_string(),
            object_id: "x".to_string(),
            category: Some(cat.to_string()),
            category_name: Some(format!("{cat}-en")),
            category_name_ar: Some(format!("{cat}-ar")),
            subcategory: sub.map(str::to_string),
            subcategory_name: sub.map(|s| format!("{s}-en")),
            subsubcategory: subsub.map(str::to_string),
            subsubcategory_name: subsub.map(|s| format!("{s}-en")),
            ..SearchDocument::default()
        }
    }

    #[test]
    fn suggestions_are_deduplicated_by_key_tuple() {
        let docs = vec![
            doc("electronics", Some("phones"), None),
            doc("electronics", Some("phones"), None),
        ];
        let suggestions = build_category_suggestions(&docs, "en", 10);
        let subcategory_count = suggestions.iter().filter(|s| s.level == 1).count();
        assert_eq!(subcategory_count, 1);
        let category_count = suggestions.iter().filter(|s| s.level == 0).count();
        assert_eq!(category_count, 1);
    }

    #[test]
    fn deeper_levels_require_ancestors() {
        // Missing subcategory: the sub-subcategory must not be emitted
        let mut orphan = doc("electronics", None, None);
        orphan.subsubcategory = Some("cases".to_string());
        let suggestions = build_category_suggestions(&[orphan], "en", 10);
        assert!(suggestions.iter().all(|s| s.level == 0));
    }

    #[test]
    fn most_specific_suggestions_come_first() {
        let docs = vec![doc("electronics", Some("phones"), Some("cases"))];
        let suggestions = build_category_suggestions(&docs, "en", 10);
        let levels: Vec<u8> = suggestions.iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![2, 1, 0]);
        assert_eq!(
            suggestions[0].display_name,
            "electronics-en > phones-en > cases-en"
        );
    }

    #[test]
    fn localized_names_fall_back_to_english() {
        let docs = vec![doc("electronics", None, None)];
        let ar = build_category_suggestions(&docs, "ar", 10);
        assert_eq!(ar[0].display_name, "electronics-ar");
        // Kurdish names are absent in the fixture, so English is used
        let ku = build_category_suggestions(&docs, "ku", 10);
        assert_eq!(ku[0].display_name, "electronics-en");
    }

    #[test]
    fn limit_caps_the_suggestion_list() {
        let docs = vec![
            doc("a", Some("a1"), Some("a11")),
            doc("b", Some("b1"), Some("b11")),
        ];
        let suggestions = build_category_suggestions(&docs, "en", 3);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions.iter().all(|s| s.level == 2 || s.level == 1));
    }
}
