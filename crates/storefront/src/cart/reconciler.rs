//! Cart reconciliation between the session-local cache and the
//! persistent store.
//!
//! The persistent store is authoritative: every successful read or
//! mutation refreshes the session cache, and the cache is only consulted
//! when the store errors. Persistence failures never block the in-memory
//! update - the caller always gets the mutated cart back, and the write
//! is retried implicitly on the next mutation (last writer wins).

use tower_sessions::Session;

use mercadito_core::ProductId;

use crate::cart::{Cart, CartOwner};
use crate::db::RepositoryError;
use crate::models::{Product, session_keys};

/// Persistence seam for cart aggregates.
///
/// Implemented by the Postgres-backed repository; tests substitute a
/// failing in-memory store to exercise the fallback policy.
#[allow(async_fn_in_trait)]
pub trait CartStore {
    /// Load the persisted cart for an owner, if any.
    async fn load(&self, owner: &CartOwner) -> Result<Option<Cart>, RepositoryError>;

    /// Persist the full cart for an owner, replacing any previous lines.
    async fn save(&self, owner: &CartOwner, cart: &Cart) -> Result<(), RepositoryError>;

    /// Delete the persisted cart for an owner.
    async fn clear(&self, owner: &CartOwner) -> Result<(), RepositoryError>;
}

/// Reconciles one identity's cart across the session cache and the store.
pub struct CartReconciler<'a, S> {
    session: &'a Session,
    store: &'a S,
}

impl<'a, S: CartStore> CartReconciler<'a, S> {
    /// Create a reconciler for one request's session.
    pub const fn new(session: &'a Session, store: &'a S) -> Self {
        Self { session, store }
    }

    /// Current cart for the owner.
    ///
    /// Reads the authoritative store and refreshes the session cache on
    /// success; falls back to the cached copy when the store errors.
    pub async fn get(&self, owner: &CartOwner) -> Cart {
        match self.store.load(owner).await {
            Ok(Some(cart)) => {
                self.write_cache(&cart).await;
                cart
            }
            Ok(None) => Cart::empty(),
            Err(e) => {
                tracing::warn!(owner = %owner.key(), "Cart load failed, using cached copy: {e}");
                self.cached().await.unwrap_or_else(Cart::empty)
            }
        }
    }

    /// Add one unit of a product to the cart.
    pub async fn add(&self, owner: &CartOwner, product: Product) -> Cart {
        let mut cart = self.get(owner).await;
        cart.add(product);
        self.commit(owner, cart).await
    }

    /// Set a line's quantity; zero or negative removes the line.
    pub async fn set_quantity(&self, owner: &CartOwner, product_id: ProductId, quantity: i64) -> Cart {
        let mut cart = self.get(owner).await;
        cart.set_quantity(product_id, quantity);
        self.commit(owner, cart).await
    }

    /// Overwrite the whole cart with a client-supplied aggregate.
    ///
    /// The input is normalized first: duplicate lines coalesced,
    /// non-positive quantities dropped, total recomputed.
    pub async fn replace(&self, owner: &CartOwner, cart: Cart) -> Cart {
        self.commit(owner, cart.normalized()).await
    }

    /// Empty the cart and drop both the cache and the persisted rows.
    pub async fn clear(&self, owner: &CartOwner) {
        if let Err(e) = self.session.remove::<Cart>(session_keys::CART_CACHE).await {
            tracing::warn!("Failed to drop cart cache from session: {e}");
        }
        if let Err(e) = self.store.clear(owner).await {
            tracing::warn!(owner = %owner.key(), "Cart clear failed, will be overwritten on next write: {e}");
        }
    }

    /// Cache then persist; the cart is returned regardless of store errors.
    async fn commit(&self, owner: &CartOwner, cart: Cart) -> Cart {
        self.write_cache(&cart).await;
        if let Err(e) = self.store.save(owner, &cart).await {
            tracing::warn!(owner = %owner.key(), "Cart persist failed, local state kept: {e}");
        }
        cart
    }

    async fn cached(&self) -> Option<Cart> {
        self.session
            .get::<Cart>(session_keys::CART_CACHE)
            .await
            .ok()
            .flatten()
    }

    async fn write_cache(&self, cart: &Cart) {
        if let Err(e) = self.session.insert(session_keys::CART_CACHE, cart).await {
            tracing::warn!("Failed to cache cart in session: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use rust_decimal::Decimal;
    use tokio::sync::Mutex;
    use tower_sessions::{MemoryStore, Session};

    use mercadito_core::{Price, ProductId};

    use super::*;
    use crate::cart::CartItem;

    /// In-memory cart store with switchable failure injection.
    #[derive(Default)]
    struct FakeStore {
        carts: Mutex<HashMap<String, Cart>>,
        fail_loads: AtomicBool,
        fail_saves: AtomicBool,
    }

    impl CartStore for FakeStore {
        async fn load(&self, owner: &CartOwner) -> Result<Option<Cart>, RepositoryError> {
            if self.fail_loads.load(Ordering::SeqCst) {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            Ok(self.carts.lock().await.get(&owner.key()).cloned())
        }

        async fn save(&self, owner: &CartOwner, cart: &Cart) -> Result<(), RepositoryError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            self.carts.lock().await.insert(owner.key(), cart.clone());
            Ok(())
        }

        async fn clear(&self, owner: &CartOwner) -> Result<(), RepositoryError> {
            self.carts.lock().await.remove(&owner.key());
            Ok(())
        }
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::new(Decimal::new(cents, 2)).expect("non-negative"),
            image_url: String::new(),
            category: "test".to_string(),
            on_sale: false,
        }
    }

    fn owner() -> CartOwner {
        CartOwner::Anonymous("t0ken".to_string())
    }

    #[tokio::test]
    async fn test_add_persists_and_returns_cart() {
        let store = FakeStore::default();
        let session = session();
        let reconciler = CartReconciler::new(&session, &store);

        let cart = reconciler.add(&owner(), product(1, 1999)).await;
        assert_eq!(cart.item_count(), 1);

        let persisted = store.load(&owner()).await.expect("load").expect("saved");
        assert_eq!(persisted, cart);
    }

    #[tokio::test]
    async fn test_get_falls_back_to_cache_when_store_errors() {
        let store = FakeStore::default();
        let session = session();
        let reconciler = CartReconciler::new(&session, &store);

        let cart = reconciler.add(&owner(), product(1, 1000)).await;

        store.fail_loads.store(true, Ordering::SeqCst);
        let recovered = reconciler.get(&owner()).await;
        assert_eq!(recovered, cart);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_lose_local_update() {
        let store = FakeStore::default();
        let session = session();
        let reconciler = CartReconciler::new(&session, &store);

        store.fail_saves.store(true, Ordering::SeqCst);
        let cart = reconciler.add(&owner(), product(1, 1000)).await;
        assert_eq!(cart.item_count(), 1);

        // Nothing persisted, but the cache carries the update across the failure
        store.fail_loads.store(true, Ordering::SeqCst);
        let recovered = reconciler.get(&owner()).await;
        assert_eq!(recovered, cart);
    }

    #[tokio::test]
    async fn test_server_copy_wins_over_cache() {
        let store = FakeStore::default();
        let session = session();
        let reconciler = CartReconciler::new(&session, &store);

        reconciler.add(&owner(), product(1, 1000)).await;

        // Another device replaced the persisted cart
        let mut other = Cart::empty();
        other.add(product(2, 500));
        store.save(&owner(), &other).await.expect("save");

        let cart = reconciler.get(&owner()).await;
        assert_eq!(cart, other);
    }

    #[tokio::test]
    async fn test_replace_normalizes_input() {
        let store = FakeStore::default();
        let session = session();
        let reconciler = CartReconciler::new(&session, &store);

        let dirty = Cart {
            items: vec![
                CartItem {
                    product: product(1, 1000),
                    quantity: 2,
                },
                CartItem {
                    product: product(1, 1000),
                    quantity: 1,
                },
            ],
            total: Decimal::ZERO,
        };

        let cart = reconciler.replace(&owner(), dirty).await;
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total, Decimal::new(3000, 2));
    }

    #[tokio::test]
    async fn test_clear_removes_cache_and_store() {
        let store = FakeStore::default();
        let session = session();
        let reconciler = CartReconciler::new(&session, &store);

        reconciler.add(&owner(), product(1, 1000)).await;
        reconciler.clear(&owner()).await;

        assert!(store.load(&owner()).await.expect("load").is_none());
        // Even with the store down there is no stale cached copy left
        store.fail_loads.store(true, Ordering::SeqCst);
        assert!(reconciler.get(&owner()).await.is_empty());
    }
}
