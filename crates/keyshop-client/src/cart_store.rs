//! # Cart Store
//!
//! The single owner of the persisted cart. Every surface that shows cart
//! state (badge, cart page, checkout summary) holds an `Arc<CartStore>` and
//! listens on [`CartStore::subscribe`] instead of reading storage.
//!
//! ## Mutation Flow
//! ```text
//! add_item / remove_item / set_quantity / clear
//!        │
//!        ▼
//! ┌──────────────────────────── lock ─────────────────────────────┐
//! │  Cart (keyshop-core) ──► mutate ──► serialize ──► storage.set │
//! └───────────────────────────── unlock ──────────────────────────┘
//!        │
//!        ▼
//! broadcast CartEvent::Changed { badge_count, totals }
//! ```
//!
//! The lock spans the whole read-modify-write, so mutations are applied in
//! call order and never interleave.
//!
//! ## Failure Policy
//! - Missing or corrupt persisted JSON loads as an empty cart.
//! - A failed write is logged; the in-memory cart keeps the change.
//! - Invalid input (empty id, negative price) is rejected with a
//!   `ValidationError` and nothing is persisted.

use std::sync::{Arc, Mutex, MutexGuard};

use keyshop_core::cart::{Cart, CartTotals};
use keyshop_core::{CartLineItem, CoreError, Money, ProductId, CART_STORAGE_KEY};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::events::{CartEvent, EVENT_CHANNEL_CAPACITY};
use crate::storage::KeyValueStore;

pub struct CartStore {
    cart: Mutex<Cart>,
    storage: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<CartEvent>,
}

impl CartStore {
    /// Creates the store and loads whatever cart is already persisted.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let cart = load_cart(storage.as_ref());
        info!(items = cart.len(), "Cart store ready");
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        CartStore {
            cart: Mutex::new(cart),
            storage,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of a product and returns the resulting line item.
    ///
    /// A repeat add keeps the name and price from the first add.
    pub fn add_item(
        &self,
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
    ) -> ClientResult<CartLineItem> {
        let (item, changed) = {
            let mut cart = self.lock();
            let item = cart.add_item(id, name, price).map_err(|e| match e {
                CoreError::Validation(v) => ClientError::Validation(v),
                other => ClientError::Core(other),
            })?;
            let item = item.clone();
            self.persist(&cart);
            (item, changed_event(&cart))
        };

        debug!(id = %item.id, quantity = item.quantity, "Added to cart");
        self.emit(changed);
        self.emit(CartEvent::ItemAdded {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
        });
        Ok(item)
    }

    /// Removes a line item. Absent ids are ignored.
    pub fn remove_item(&self, id: &str) {
        let changed = {
            let mut cart = self.lock();
            if !cart.remove_item(id) {
                debug!(id, "Remove ignored, not in cart");
                return;
            }
            self.persist(&cart);
            changed_event(&cart)
        };
        debug!(id, "Removed from cart");
        self.emit(changed);
    }

    /// Sets a line item's quantity. Zero or less removes the item, and
    /// anything above `u32::MAX` is clamped to it. Absent ids are ignored.
    pub fn set_quantity(&self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }

        let changed = {
            let mut cart = self.lock();
            if !cart.set_quantity(id, quantity) {
                return;
            }
            self.persist(&cart);
            changed_event(&cart)
        };
        debug!(id, quantity, "Cart quantity set");
        self.emit(changed);
    }

    /// Empties the cart.
    pub fn clear(&self) {
        let changed = {
            let mut cart = self.lock();
            if cart.is_empty() {
                return;
            }
            cart.clear();
            self.persist(&cart);
            changed_event(&cart)
        };
        info!("Cart cleared");
        self.emit(changed);
    }

    /// Re-reads the persisted cart, picking up writes made by another
    /// client sharing the same storage. Returns `true` if anything changed.
    pub fn reload_from_storage(&self) -> bool {
        let changed = {
            let mut cart = self.lock();
            let stored = load_cart(self.storage.as_ref());
            if stored == *cart {
                return false;
            }
            *cart = stored;
            changed_event(&cart)
        };
        debug!("Cart reloaded from storage");
        self.emit(changed);
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn read_all(&self) -> Vec<CartLineItem> {
        self.lock().items().to_vec()
    }

    pub fn badge_count(&self) -> u64 {
        self.lock().badge_count()
    }

    pub fn totals(&self) -> CartTotals {
        self.lock().totals()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, cart: &Cart) {
        let result = serde_json::to_string(cart)
            .map_err(ClientError::from)
            .and_then(|json| self.storage.set(CART_STORAGE_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    fn emit(&self, event: CartEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn changed_event(cart: &Cart) -> CartEvent {
    CartEvent::Changed {
        badge_count: cart.badge_count(),
        totals: cart.totals(),
    }
}

fn load_cart(storage: &dyn KeyValueStore) -> Cart {
    match storage.get(CART_STORAGE_KEY) {
        Ok(Some(json)) => serde_json::from_str::<Cart>(&json).unwrap_or_else(|e| {
            warn!(error = %e, "Persisted cart is corrupt, starting empty");
            Cart::new()
        }),
        Ok(None) => Cart::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read persisted cart, starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use keyshop_core::ValidationError;

    /// Storage that refuses every read and write.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> ClientResult<Option<String>> {
            Err(ClientError::StorageFailed("quota exceeded".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> ClientResult<()> {
            Err(ClientError::StorageFailed("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> ClientResult<()> {
            Err(ClientError::StorageFailed("quota exceeded".into()))
        }
    }

    fn store() -> (Arc<MemoryStore>, CartStore) {
        let storage = Arc::new(MemoryStore::new());
        let cart = CartStore::new(storage.clone());
        (storage, cart)
    }

    #[test]
    fn test_add_to_empty_cart() {
        let (storage, cart) = store();
        cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();

        let items = cart.read_all();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "7");
        assert_eq!(items[0].name, "Keycap Set");
        assert_eq!(items[0].price, Money::from_cents(2499));
        assert_eq!(items[0].quantity, 1);
        assert_eq!(cart.badge_count(), 1);

        let persisted = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&persisted).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"id": "7", "name": "Keycap Set", "price": 24.99, "quantity": 1}])
        );
    }

    #[test]
    fn test_repeat_add_keeps_first_name_and_price() {
        let (_, cart) = store();
        cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
        let item = cart
            .add_item("7", "Renamed", Money::from_cents(1))
            .unwrap();

        assert_eq!(item.quantity, 2);
        assert_eq!(item.name, "Keycap Set");
        assert_eq!(item.price, Money::from_cents(2499));
        assert_eq!(cart.read_all().len(), 1);
    }

    #[test]
    fn test_invalid_input_rejected_without_side_effects() {
        let (storage, cart) = store();
        let mut rx = cart.subscribe();

        let err = cart.add_item("", "Nameless", Money::from_cents(100)).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::Required { .. })));

        let err = cart.add_item("3", "Refund", Money::from_cents(-100)).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::Negative { .. })));

        assert!(cart.read_all().is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap(), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let (_, cart) = store();
        cart.add_item("1", "Switch Puller", Money::from_cents(450)).unwrap();
        cart.add_item("2", "Lube Station", Money::from_cents(1800)).unwrap();

        cart.set_quantity("1", 4);
        assert_eq!(cart.badge_count(), 5);

        cart.set_quantity("missing", 3);
        assert_eq!(cart.read_all().len(), 2);

        cart.set_quantity("1", 0);
        let ids: Vec<_> = cart.read_all().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![ProductId::from("2")]);

        cart.remove_item("missing");
        cart.remove_item("2");
        assert!(cart.read_all().is_empty());
        assert_eq!(cart.badge_count(), 0);
    }

    #[test]
    fn test_totals_and_shipping() {
        let (_, cart) = store();
        cart.add_item("1", "Case", Money::from_cents(4000)).unwrap();
        let totals = cart.totals();
        assert_eq!(totals.shipping, Money::from_cents(999));
        assert_eq!(totals.total, Money::from_cents(4999));

        cart.set_quantity("1", 3);
        let totals = cart.totals();
        assert_eq!(totals.subtotal, Money::from_cents(12000));
        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.total, Money::from_cents(12000));
    }

    #[test]
    fn test_events_follow_mutations() {
        let (_, cart) = store();
        let mut rx = cart.subscribe();

        cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            CartEvent::Changed { badge_count: 1, .. }
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            CartEvent::ItemAdded {
                id: ProductId::from("7"),
                name: "Keycap Set".into(),
                quantity: 1
            }
        );

        cart.remove_item("7");
        assert!(matches!(
            rx.try_recv().unwrap(),
            CartEvent::Changed { badge_count: 0, .. }
        ));

        // No-op removal is silent.
        cart.remove_item("7");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_persisted_cart_survives_restart() {
        let storage = Arc::new(MemoryStore::new());
        {
            let cart = CartStore::new(storage.clone());
            cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
            cart.add_item("9", "Deskmat", Money::from_cents(2900)).unwrap();
            cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
        }

        let reopened = CartStore::new(storage);
        let items = reopened.read_all();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id.as_str(), "7");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].id.as_str(), "9");
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(CART_STORAGE_KEY, "{not json").unwrap();
        let cart = CartStore::new(storage);
        assert!(cart.read_all().is_empty());
    }

    #[test]
    fn test_huge_persisted_cart_keeps_working() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                CART_STORAGE_KEY,
                r#"[{"id":"1","name":"Gold Keyboard","price":1e16,"quantity":10}]"#,
            )
            .unwrap();
        let cart = CartStore::new(storage);
        let mut rx = cart.subscribe();

        cart.add_item("2", "Keycap Set", Money::from_cents(2499)).unwrap();
        cart.set_quantity("2", 100_000);

        assert_eq!(cart.badge_count(), 100_010);
        assert_eq!(cart.totals().total.cents(), i64::MAX);
        assert!(matches!(
            rx.try_recv().unwrap(),
            CartEvent::Changed { badge_count: 11, .. }
        ));
    }

    #[test]
    fn test_broken_storage_degrades_silently() {
        let cart = CartStore::new(Arc::new(BrokenStore));
        assert!(cart.read_all().is_empty());

        cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
        assert_eq!(cart.badge_count(), 1);
    }

    #[test]
    fn test_reload_picks_up_other_writer() {
        let storage = Arc::new(MemoryStore::new());
        let tab_a = CartStore::new(storage.clone());
        let tab_b = CartStore::new(storage.clone());
        let mut rx = tab_b.subscribe();

        tab_a.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
        assert!(tab_b.read_all().is_empty());

        assert!(tab_b.reload_from_storage());
        assert_eq!(tab_b.badge_count(), 1);
        assert!(matches!(rx.try_recv().unwrap(), CartEvent::Changed { .. }));

        assert!(!tab_b.reload_from_storage());
    }

    #[test]
    fn test_clear() {
        let (storage, cart) = store();
        cart.add_item("7", "Keycap Set", Money::from_cents(2499)).unwrap();
        cart.clear();
        assert!(cart.read_all().is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }
}
