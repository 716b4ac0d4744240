//! Registry handing out one search client per logical collection
//!
//! The registry is an explicitly constructed value the application owns
//! and passes around, which keeps tests hermetic. Clients are built
//! lazily, cached, and constructed exactly once per collection even
//! under concurrent access (each slot is mutex-guarded).

use crate::client::SearchClient;
use crate::error::SearchError;
use crate::transport::{HttpTransport, SearchTransport};
use bazaar_core::config::SearchConfig;
use futures::future::join_all;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

type Slot = Mutex<Option<Arc<SearchClient>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Arc<SearchClient>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-collection client registry sharing one transport and config.
pub struct SearchServices {
    config: SearchConfig,
    transport: Arc<dyn SearchTransport>,
    main: Slot,
    shop_products: Slot,
    orders: Slot,
    shops: Slot,
}

impl SearchServices {
    /// Create a registry backed by the real HTTP transport.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let transport = Arc::new(HttpTransport::new(&config.host, &config.api_key)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Create a registry over an arbitrary transport (mock in tests).
    pub fn with_transport(config: SearchConfig, transport: Arc<dyn SearchTransport>) -> Self {
        info!("Initializing search services for host {}", config.host);
        Self {
            config,
            transport,
            main: Slot::default(),
            shop_products: Slot::default(),
            orders: Slot::default(),
            shops: Slot::default(),
        }
    }

    fn get_or_build(&self, slot: &Slot, collection: &str) -> Arc<SearchClient> {
        let mut slot = lock(slot);
        if let Some(client) = slot.as_ref() {
            return Arc::clone(client);
        }
        let client = Arc::new(SearchClient::new(
            Arc::clone(&self.transport),
            collection,
            self.config.clone(),
        ));
        *slot = Some(Arc::clone(&client));
        client
    }

    /// Client for the main product catalog
    pub fn main_service(&self) -> Arc<SearchClient> {
        self.get_or_build(&self.main, &self.config.products_collection)
    }

    /// Client for shop-scoped products
    pub fn shop_products_service(&self) -> Arc<SearchClient> {
        self.get_or_build(
            &self.shop_products,
            &self.config.shop_products_collection,
        )
    }

    /// Client for orders
    pub fn orders_service(&self) -> Arc<SearchClient> {
        self.get_or_build(&self.orders, &self.config.orders_collection)
    }

    /// Client for the shop directory
    pub fn shops_service(&self) -> Arc<SearchClient> {
        self.get_or_build(&self.shops, &self.config.shops_collection)
    }

    /// True only once all four clients have been constructed
    pub fn is_initialized(&self) -> bool {
        lock(&self.main).is_some()
            && lock(&self.shop_products).is_some()
            && lock(&self.orders).is_some()
            && lock(&self.shops).is_some()
    }

    /// Discard all cached clients, forcing fresh construction on next
    /// access. Used for reconfiguration and testing.
    pub fn reset_services(&self) {
        info!("Resetting search services");
        *lock(&self.main) = None;
        *lock(&self.shop_products) = None;
        *lock(&self.orders) = None;
        *lock(&self.shops) = None;
    }

    /// Probe all four collections concurrently; healthy only if every
    /// probe succeeds.
    pub async fn is_healthy(&self) -> bool {
        let clients = [
            self.main_service(),
            self.shop_products_service(),
            self.orders_service(),
            self.shops_service(),
        ];
        let probes = clients.iter().map(|c| c.is_service_reachable());
        let results = join_all(probes).await;
        let healthy = results.iter().all(|ok| *ok);
        if !healthy {
            warn!("Search health check failed: {results:?}");
        }
        healthy
    }
}
