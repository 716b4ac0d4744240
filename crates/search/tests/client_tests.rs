//! Integration tests for the search client over a scripted transport

use bazaar_core::config::SearchConfig;
use bazaar_core::models::{FacetedSearchRequest, SortOption};
use bazaar_search::{MockTransport, SearchClient, SearchError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn test_client(transport: Arc<MockTransport>) -> SearchClient {
    SearchClient::new(transport, "products", SearchConfig::default())
}

fn products_body() -> String {
    json!({
        "found": 5,
        "hits": [
            {"document": {"id": "products_p1", "name": "Phone One", "price": 199.0}},
            {"document": {"id": "products_p2", "name": "Phone Two", "price": 299.0}},
        ]
    })
    .to_string()
}

#[tokio::test(start_paused = true)]
async fn faceted_search_end_to_end() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(200, &products_body());
    let client = test_client(Arc::clone(&transport));

    let page = client
        .search_ids_with_facets(FacetedSearchRequest {
            index_name: Some("products".to_string()),
            query: Some("phone".to_string()),
            page: 0,
            hits_per_page: 2,
            facet_filters: vec![vec!["color:black".to_string()]],
            ..Default::default()
        })
        .await;

    assert_eq!(page.ids, vec!["p1", "p2"]);
    assert_eq!(page.hits.len(), 2);
    assert_eq!(page.hits[0].name.as_deref(), Some("Phone One"));
    assert_eq!(page.page, 0);
    assert_eq!(page.nb_pages, 3);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let params = &requests[0].params;
    assert_eq!(params.q, "phone");
    assert_eq!(params.page, 1, "wire page is 1-indexed");
    assert_eq!(params.per_page, 2);
    assert_eq!(params.filter_by.as_deref(), Some("color:=black"));
}

#[tokio::test(start_paused = true)]
async fn permanent_network_failure_degrades_to_empty() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_error(SearchError::Transport("connection refused".to_string()));
    let client = test_client(Arc::clone(&transport));

    let hits = client
        .search_products("phone", SortOption::Relevance, 0, 20, &[])
        .await;

    assert!(hits.is_empty());
    // Transient failures are retried up to the attempt bound
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn server_errors_are_retried_then_degrade() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(503, "upstream unavailable");
    let client = test_client(Arc::clone(&transport));

    let hits = client
        .search_products("phone", SortOption::Relevance, 0, 20, &[])
        .await;

    assert!(hits.is_empty());
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_not_retried() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(400, r#"{"message": "bad filter"}"#);
    let client = test_client(Arc::clone(&transport));

    let hits = client
        .search_products("phone", SortOption::Relevance, 0, 20, &[])
        .await;

    assert!(hits.is_empty());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn transient_failure_then_success_recovers() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_error(SearchError::Timeout("5s elapsed".to_string()));
    transport.enqueue_json(200, &products_body());
    let client = test_client(Arc::clone(&transport));

    let hits = client
        .search_products("phone", SortOption::Relevance, 0, 20, &[])
        .await;

    assert_eq!(hits.len(), 2);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn debounced_burst_executes_one_search() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(200, &products_body());
    let client = test_client(Arc::clone(&transport));

    let results = futures::future::join_all([
        client.debounced_search_products("p", SortOption::Relevance, 0, 20, &[]),
        client.debounced_search_products("ph", SortOption::Relevance, 0, 20, &[]),
        client.debounced_search_products("pho", SortOption::Relevance, 0, 20, &[]),
    ])
    .await;

    assert_eq!(transport.call_count(), 1);
    for hits in &results {
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "p1");
    }
    // Only the most recent call of the burst went to the engine
    assert_eq!(transport.requests()[0].params.q, "pho");
}

#[tokio::test(start_paused = true)]
async fn shop_product_search_is_scoped_to_the_shop() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(200, &products_body());
    let client = test_client(Arc::clone(&transport));

    client
        .search_shop_products(
            "shop42",
            "",
            SortOption::PriceAsc,
            0,
            20,
            &["category:\"phones\"".to_string()],
        )
        .await;

    let request = &transport.requests()[0];
    assert_eq!(request.collection, "shop_products");
    assert_eq!(
        request.params.filter_by.as_deref(),
        Some("shop_id:=shop42 && category:=phones")
    );
    assert_eq!(request.params.q, "*", "empty query becomes match-all");
    assert_eq!(request.params.sort_by.as_deref(), Some("price:asc"));
}

#[tokio::test(start_paused = true)]
async fn order_search_selects_role_field() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(200, r#"{"found": 0, "hits": []}"#);
    let client = test_client(Arc::clone(&transport));

    client.search_orders("shoes", "u1", false, 0, 10).await;
    client.search_orders("shoes", "u1", true, 0, 10).await;

    let requests = transport.requests();
    assert_eq!(requests[0].collection, "orders");
    assert_eq!(requests[0].params.filter_by.as_deref(), Some("buyer_id:=u1"));
    assert_eq!(requests[1].params.filter_by.as_deref(), Some("seller_id:=u1"));
    // Order searches get the longer timeout
    assert_eq!(requests[0].timeout, Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn category_suggestions_are_deduplicated() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(
        200,
        &json!({
            "found": 2,
            "hits": [
                {"document": {
                    "id": "products_a",
                    "category": "electronics", "category_name": "Electronics",
                    "subcategory": "phones", "subcategory_name": "Phones",
                }},
                {"document": {
                    "id": "products_b",
                    "category": "electronics", "category_name": "Electronics",
                    "subcategory": "phones", "subcategory_name": "Phones",
                }},
            ]
        })
        .to_string(),
    );
    let client = test_client(Arc::clone(&transport));

    let suggestions = client.search_categories("pho", None, "en").await;

    let subcategory_suggestions: Vec<_> =
        suggestions.iter().filter(|s| s.level == 1).collect();
    assert_eq!(subcategory_suggestions.len(), 1);
    assert_eq!(subcategory_suggestions[0].display_name, "Electronics > Phones");
    // Category suggestions use the shorter typeahead timeout
    assert_eq!(transport.requests()[0].timeout, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn spec_facets_drop_zero_counts() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(
        200,
        &json!({
            "found": 12,
            "hits": [],
            "facet_counts": [
                {"field_name": "brand", "counts": [
                    {"value": "Acme", "count": 7},
                    {"value": "Stale", "count": 0},
                ]},
                {"field_name": "size", "counts": [{"value": "XL", "count": 2}]},
            ]
        })
        .to_string(),
    );
    let client = test_client(Arc::clone(&transport));

    let facets = client.fetch_spec_facets(None, "", &[], None).await;

    assert_eq!(facets["brand"].len(), 1);
    assert_eq!(facets["brand"][0].value, "Acme");
    assert_eq!(facets["size"][0].count, 2);

    let params = &transport.requests()[0].params;
    assert_eq!(params.facet_by.as_deref(), Some("type,brand,material,size"));
    assert_eq!(params.per_page, 0, "facet query requests no documents");
}

#[tokio::test(start_paused = true)]
async fn reachability_probe_tolerates_semantic_failures() {
    let transport = Arc::new(MockTransport::new());
    transport.enqueue_json(404, "collection missing");
    let client = test_client(Arc::clone(&transport));
    // Up even though the query itself failed semantically
    assert!(client.is_service_reachable().await);

    let transport = Arc::new(MockTransport::new());
    transport.enqueue_error(SearchError::Transport("connection refused".to_string()));
    let client = test_client(Arc::clone(&transport));
    assert!(!client.is_service_reachable().await);
}
