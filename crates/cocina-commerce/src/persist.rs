//! Session persistence for the cart.
//!
//! The cart is stored as an ordered JSON array of
//! `{productId, name, unitPrice, quantity, image}` records under
//! `{namespace}:{session}`. Loading never fails: anything missing or
//! malformed yields an empty cart. Saving happens on a write-behind worker so
//! cart mutations never wait on storage.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cocina_cache::{cache_key, Cache, SessionId};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartSnapshot, CartStore, CartUpdate, LineItem};
use crate::config::StoreConfig;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use crate::observer::Subscription;

/// One persisted line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    pub product_id: ProductId,
    pub name: String,
    /// Minor units in the configured currency.
    pub unit_price: i64,
    pub quantity: i64,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartRecord {
    fn from_line(line: &LineItem) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price.amount_cents,
            quantity: line.quantity,
            image: line.image.clone(),
        }
    }

    fn into_line(self, currency: Currency) -> LineItem {
        LineItem {
            product_id: self.product_id,
            name: self.name,
            unit_price: Money::new(self.unit_price, currency),
            quantity: self.quantity,
            image: self.image,
        }
    }
}

/// Records for a snapshot, in cart order.
pub fn records(snapshot: &CartSnapshot) -> Vec<CartRecord> {
    snapshot.items.iter().map(CartRecord::from_line).collect()
}

/// Storage key of the cart for `session`.
pub fn cart_key(config: &StoreConfig, session: &SessionId) -> String {
    cache_key!(config.namespace.as_str(), session)
}

/// Load the cart stored under `key`.
///
/// Missing data, an unreadable store, invalid JSON and records that break a
/// cart invariant all produce an empty cart.
pub fn load_cart(cache: &Cache, key: &str, config: &StoreConfig) -> Cart {
    let empty = || Cart::new(config.currency).with_max_quantity(config.max_quantity_per_item);

    let records = match cache.get::<Vec<CartRecord>>(key) {
        Ok(Some(records)) => records,
        Ok(None) => {
            tracing::debug!(key, "no stored cart");
            return empty();
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "stored cart unreadable, starting empty");
            return empty();
        }
    };

    let lines = records
        .into_iter()
        .map(|r| r.into_line(config.currency))
        .collect();
    match Cart::from_items(config.currency, config.max_quantity_per_item, lines) {
        Ok(cart) => {
            tracing::debug!(key, items = cart.unique_item_count(), "restored cart");
            cart
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "stored cart invalid, starting empty");
            empty()
        }
    }
}

/// Load the cart for `key` into a new store.
pub fn open_store(cache: &Cache, key: &str, config: &StoreConfig) -> CartStore {
    CartStore::with_cart(load_cart(cache, key, config))
}

enum Job {
    Save(Arc<CartSnapshot>),
    Flush(Sender<()>),
}

/// Keeps a cache in sync with a [`CartStore`].
///
/// Every committed mutation queues its snapshot; a worker thread writes the
/// newest queued snapshot and skips older ones. Write failures are logged and
/// the in-memory cart stays authoritative. Dropping the handle detaches from
/// the store and waits for pending writes.
pub struct CartPersistence {
    subscription: Option<Subscription>,
    jobs: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl CartPersistence {
    /// Start persisting `store` under `key`.
    pub fn attach(
        store: &CartStore,
        cache: Cache,
        key: impl Into<String>,
    ) -> Result<Self, CommerceError> {
        let key = key.into();
        let (jobs, rx) = mpsc::channel();
        let start_version = store.version();

        let worker = thread::Builder::new()
            .name("cart-persist".to_string())
            .spawn(move || run_worker(rx, cache, key, start_version))
            .map_err(|e| CommerceError::StorageError(e.to_string()))?;

        let queue = jobs.clone();
        let subscription = store.subscribe(move |update: &CartUpdate| {
            if queue.send(Job::Save(Arc::clone(&update.snapshot))).is_err() {
                tracing::warn!("cart persistence worker gone, change not saved");
            }
        });

        Ok(Self {
            subscription: Some(subscription),
            jobs: Some(jobs),
            worker: Some(worker),
        })
    }

    /// Block until every change queued so far has been written (or failed).
    pub fn flush(&self) {
        let Some(jobs) = &self.jobs else {
            return;
        };
        let (ack, done) = mpsc::channel();
        if jobs.send(Job::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

impl Drop for CartPersistence {
    fn drop(&mut self) {
        // Detach first so no new jobs race the shutdown.
        self.subscription.take();
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("cart persistence worker panicked");
            }
        }
    }
}

impl std::fmt::Debug for CartPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPersistence")
            .field("attached", &self.subscription.is_some())
            .finish()
    }
}

fn run_worker(rx: Receiver<Job>, cache: Cache, key: String, mut written: u64) {
    while let Ok(first) = rx.recv() {
        let mut latest: Option<Arc<CartSnapshot>> = None;
        let mut waiters = Vec::new();

        for job in std::iter::once(first).chain(rx.try_iter()) {
            match job {
                Job::Save(snapshot) => {
                    if latest.as_ref().map_or(true, |l| snapshot.version > l.version) {
                        latest = Some(snapshot);
                    }
                }
                Job::Flush(ack) => waiters.push(ack),
            }
        }

        if let Some(snapshot) = latest.filter(|s| s.version > written) {
            match cache.set(&key, &records(&snapshot)) {
                Ok(()) => {
                    written = snapshot.version;
                    tracing::debug!(key = %key, version = written, "cart saved");
                }
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        version = snapshot.version,
                        error = %e,
                        "cart save failed"
                    );
                }
            }
        }

        for ack in waiters {
            let _ = ack.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::CartProduct;

    fn product(id: &str, cents: i64) -> CartProduct {
        CartProduct::new(id, format!("Product {}", id), Money::new(cents, Currency::EUR))
    }

    #[test]
    fn test_record_format_is_camel_case() {
        let record = CartRecord {
            product_id: "p1".into(),
            name: "Olla".to_string(),
            unit_price: 1250,
            quantity: 2,
            image: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "productId": "p1",
                "name": "Olla",
                "unitPrice": 1250,
                "quantity": 2,
                "image": null
            })
        );
    }

    #[test]
    fn test_cart_key() {
        let key = cart_key(&StoreConfig::default(), &SessionId::new("sess_1"));
        assert_eq!(key, "cart:sess_1");
    }

    #[test]
    fn test_load_missing_is_empty() {
        let cache = Cache::open_memory();
        let cart = load_cart(&cache, "cart:none", &StoreConfig::default());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let cache = Cache::open_memory();
        cache.set_raw("cart:s", b"\x00garbage{").unwrap();
        assert!(load_cart(&cache, "cart:s", &StoreConfig::default()).is_empty());

        cache.set("cart:s", &serde_json::json!({"items": 3})).unwrap();
        assert!(load_cart(&cache, "cart:s", &StoreConfig::default()).is_empty());
    }

    #[test]
    fn test_load_invalid_records_is_empty() {
        let cache = Cache::open_memory();
        let dup = serde_json::json!([
            {"productId": "p1", "name": "A", "unitPrice": 10, "quantity": 1, "image": null},
            {"productId": "p1", "name": "A", "unitPrice": 10, "quantity": 2, "image": null}
        ]);
        cache.set("cart:s", &dup).unwrap();
        assert!(load_cart(&cache, "cart:s", &StoreConfig::default()).is_empty());

        let zero = serde_json::json!([
            {"productId": "p1", "name": "A", "unitPrice": 10, "quantity": 0}
        ]);
        cache.set("cart:s", &zero).unwrap();
        assert!(load_cart(&cache, "cart:s", &StoreConfig::default()).is_empty());
    }

    #[test]
    fn test_load_overflowing_count_is_empty() {
        let cache = Cache::open_memory();
        let config = StoreConfig {
            max_quantity_per_item: i64::MAX,
            ..StoreConfig::default()
        };
        let stored = serde_json::json!([
            {"productId": "a", "name": "A", "unitPrice": 0, "quantity": i64::MAX},
            {"productId": "b", "name": "B", "unitPrice": 0, "quantity": 1}
        ]);
        cache.set("cart:s", &stored).unwrap();

        let store = open_store(&cache, "cart:s", &config);
        assert!(store.is_empty());
        assert_eq!(store.total_items(), 0);
    }

    #[test]
    fn test_load_valid_records_keeps_order() {
        let cache = Cache::open_memory();
        let stored = serde_json::json!([
            {"productId": "b", "name": "B", "unitPrice": 5, "quantity": 1},
            {"productId": "a", "name": "A", "unitPrice": 10, "quantity": 5, "image": "/a.png"}
        ]);
        cache.set("cart:s", &stored).unwrap();

        let cart = load_cart(&cache, "cart:s", &StoreConfig::default());
        let ids: Vec<&str> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(cart.subtotal().amount_cents, 55);
        assert_eq!(cart.items()[1].image.as_deref(), Some("/a.png"));
    }

    #[test]
    fn test_persistence_writes_latest_snapshot() {
        let cache = Cache::open_memory();
        let store = CartStore::new(Currency::EUR);
        let persistence = CartPersistence::attach(&store, cache.clone(), "cart:s").unwrap();

        store.add_item(&product("p1", 10), 2).unwrap();
        store.add_item(&product("p2", 5), 1).unwrap();
        store.set_quantity(&"p1".into(), 5).unwrap();
        persistence.flush();

        let saved: Vec<CartRecord> = cache.get("cart:s").unwrap().unwrap();
        assert_eq!(saved, records(&store.snapshot()));
        assert_eq!(saved[0].quantity, 5);
    }

    #[test]
    fn test_clear_is_persisted_as_empty_list() {
        let cache = Cache::open_memory();
        let store = CartStore::new(Currency::EUR);
        let persistence = CartPersistence::attach(&store, cache.clone(), "cart:s").unwrap();

        store.add_one(&product("p1", 10)).unwrap();
        store.clear();
        persistence.flush();

        let saved: Vec<CartRecord> = cache.get("cart:s").unwrap().unwrap();
        assert!(saved.is_empty());
    }

    #[test]
    fn test_drop_detaches_and_drains() {
        let cache = Cache::open_memory();
        let store = CartStore::new(Currency::EUR);
        let persistence = CartPersistence::attach(&store, cache.clone(), "cart:s").unwrap();

        store.add_one(&product("p1", 10)).unwrap();
        drop(persistence);
        assert_eq!(store.subscriber_count(), 0);

        let saved: Vec<CartRecord> = cache.get("cart:s").unwrap().unwrap();
        assert_eq!(saved.len(), 1);

        store.add_one(&product("p2", 10)).unwrap();
        let saved: Vec<CartRecord> = cache.get("cart:s").unwrap().unwrap();
        assert_eq!(saved.len(), 1);
    }
}
