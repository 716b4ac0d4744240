use bazaar_core::config::{Config, SearchConfig};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

// The process environment is shared across the parallel test harness;
// every test that reads or writes it must hold this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[test]
fn search_config_defaults() {
    let config = SearchConfig::default();
    assert_eq!(config.products_collection, "products");
    assert_eq!(config.shop_products_collection, "shop_products");
    assert_eq!(config.orders_collection, "orders");
    assert_eq!(config.shops_collection, "shops");
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.base_delay_ms, 500);
    assert_eq!(config.timeout_ms, 5_000);
    assert_eq!(config.category_timeout_ms, 3_000);
    assert_eq!(config.order_timeout_ms, 10_000);
    assert_eq!(config.debounce_ms, 300);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let _guard = env_lock();
    let config = Config::from_file(Path::new("/nonexistent/bazaar.toml")).unwrap();
    assert_eq!(config.search.products_collection, "products");
    assert!(!config.search.host.is_empty());
    assert!(!config.search.api_key.is_empty());
}

#[test]
fn environment_overrides_take_precedence() {
    let _guard = env_lock();
    std::env::set_var("TYPESENSE_HOST", "search.override.example");
    std::env::set_var("TYPESENSE_SEARCH_KEY", "override-key");

    let config = Config::from_file(Path::new("/nonexistent/bazaar.toml")).unwrap();
    assert_eq!(config.search.host, "search.override.example");
    assert_eq!(config.search.api_key, "override-key");

    std::env::remove_var("TYPESENSE_HOST");
    std::env::remove_var("TYPESENSE_SEARCH_KEY");
}

#[test]
fn toml_round_trip_keeps_values() {
    let config = Config::from_toml_str(
        r#"
        [search]
        host = "search.example.com"
        products_collection = "catalog"
        "#,
    )
    .unwrap();
    assert_eq!(config.search.host, "search.example.com");
    assert_eq!(config.search.products_collection, "catalog");
    assert_eq!(config.search.orders_collection, "orders");
}
