//! The cart store: sole owner of the persisted cart.
//!
//! Every operation reads the full list from storage, applies one change, and
//! writes the full list back. There are no partial updates. After each write
//! the store calls its listeners with the new cart so views can re-render.
//!
//! Read-modify-write is atomic within one document only. Two documents
//! sharing a storage area race, and the last write wins. Listening for
//! [`StorageEvent`]s (see [`CartStore::sync`]) refreshes the view after
//! another document writes, but does not prevent the lost update.

use std::cell::RefCell;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use timepiece_core::{Cart, OrderSummary, PricingRules, Product, ProductId};

use crate::error::Result;
use crate::storage::{Storage, StorageEvent, StorageEvents};

/// Storage key holding the cart unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Callback invoked with the current cart after every write or refresh.
pub type CartListener = Box<dyn FnMut(&Cart)>;

/// Cart persistence over a [`Storage`] area.
pub struct CartStore<S> {
    storage: S,
    key: String,
    events: Option<StorageEvents>,
    listeners: Vec<CartListener>,
    // Last raw value whose repairs were logged at warn level.
    reported: RefCell<Option<String>>,
}

impl<S: Storage> CartStore<S> {
    /// Create a store on `storage` under the default key.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_CART_KEY)
    }

    /// Create a store on `storage` under `key`.
    #[must_use]
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let events = storage.subscribe();
        Self {
            storage,
            key: key.into(),
            events,
            listeners: Vec::new(),
            reported: RefCell::new(None),
        }
    }

    /// Storage key holding the cart.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage area.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Register a listener called with the cart after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&Cart) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Load the persisted cart.
    ///
    /// A missing or malformed value yields an empty cart. Entries that
    /// cannot be repaired are dropped. Repairs are warned about once per
    /// stored value and logged at debug level on later reads.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage area cannot be read.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn read(&self) -> Result<Cart> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(Cart::new());
        };

        match Cart::from_json(&raw) {
            Ok(load) => {
                if !load.issues.is_empty() {
                    let first = self.first_report(&raw);
                    for issue in &load.issues {
                        if first {
                            warn!(%issue, "Repaired persisted cart entry");
                        } else {
                            debug!(%issue, "Repaired persisted cart entry");
                        }
                    }
                }
                Ok(load.cart)
            }
            Err(e) => {
                if self.first_report(&raw) {
                    warn!(error = %e, "Persisted cart is malformed, treating as empty");
                } else {
                    debug!(error = %e, "Persisted cart is malformed, treating as empty");
                }
                Ok(Cart::new())
            }
        }
    }

    /// Whether `raw` differs from the last value reported as needing repair.
    fn first_report(&self, raw: &str) -> bool {
        let mut reported = self.reported.borrow_mut();
        if reported.as_deref() == Some(raw) {
            return false;
        }
        *reported = Some(raw.to_owned());
        true
    }

    /// Persist the full cart and notify listeners.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized or the storage area
    /// rejects the write (e.g. quota exceeded). Listeners are not called then.
    #[instrument(skip(self, cart), fields(key = %self.key))]
    pub fn write(&mut self, cart: &Cart) -> Result<()> {
        let json = cart.to_json()?;
        self.storage.set_item(&self.key, &json)?;
        debug!(items = cart.len(), units = cart.item_count(), "Cart saved");
        self.notify(cart);
        Ok(())
    }

    /// Add one unit of `product`.
    ///
    /// A product already in the cart only has its quantity incremented; the
    /// stored name and price are kept. Not idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&mut self, product: &Product) -> Result<Cart> {
        let mut cart = self.read()?;
        let quantity = cart.add(product);
        debug!(%quantity, "Added to cart");
        self.write(&cart)?;
        Ok(cart)
    }

    /// Remove the line for `id`. An absent id is a no-op and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area fails.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: &ProductId) -> Result<Cart> {
        let mut cart = self.read()?;
        if cart.remove(id).is_some() {
            self.write(&cart)?;
        }
        Ok(cart)
    }

    /// Replace the quantity of the line for `id`.
    ///
    /// A quantity of 0 or below is the same as [`CartStore::remove`]. An
    /// absent id is a no-op and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area fails.
    #[instrument(skip(self))]
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<Cart> {
        let mut cart = self.read()?;
        if cart.set_quantity(id, quantity) {
            self.write(&cart)?;
        }
        Ok(cart)
    }

    /// Add one unit to an existing line. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area fails.
    #[instrument(skip(self))]
    pub fn increase(&mut self, id: &ProductId) -> Result<Cart> {
        let mut cart = self.read()?;
        if cart.increase(id).is_some() {
            self.write(&cart)?;
        }
        Ok(cart)
    }

    /// Take one unit off an existing line, never below 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area fails.
    #[instrument(skip(self))]
    pub fn decrease(&mut self, id: &ProductId) -> Result<Cart> {
        let mut cart = self.read()?;
        if cart.decrease(id).is_some() {
            self.write(&cart)?;
        }
        Ok(cart)
    }

    /// Reset the cart to empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area fails.
    pub fn clear(&mut self) -> Result<()> {
        self.write(&Cart::new())
    }

    /// Sum of `unit price x quantity` over the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area cannot be read.
    pub fn total(&self) -> Result<Decimal> {
        Ok(self.read()?.subtotal())
    }

    /// Total units in the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area cannot be read.
    pub fn item_count(&self) -> Result<u64> {
        Ok(self.read()?.item_count())
    }

    /// Subtotal, shipping, tax and total for the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area cannot be read.
    pub fn summary(&self, rules: &PricingRules) -> Result<OrderSummary> {
        Ok(OrderSummary::for_cart(&self.read()?, rules))
    }

    /// React to a change made by another document.
    ///
    /// Events for this store's key, or for the whole area being cleared,
    /// re-read the cart and notify listeners. Returns whether it refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area cannot be read.
    pub fn handle_storage_event(&mut self, event: &StorageEvent) -> Result<bool> {
        if !event.concerns(&self.key) {
            return Ok(false);
        }
        let cart = self.read()?;
        debug!(key = %self.key, items = cart.len(), "Cart changed in another document");
        self.notify(&cart);
        Ok(true)
    }

    /// Process every pending event from other documents.
    ///
    /// Several pending changes lead to a single refresh. Returns whether it
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage area cannot be read.
    pub fn sync(&mut self) -> Result<bool> {
        let Some(events) = self.events.as_mut() else {
            return Ok(false);
        };
        let latest = events
            .drain()
            .into_iter()
            .rev()
            .find(|event| event.concerns(&self.key));
        match latest {
            Some(event) => self.handle_storage_event(&event),
            None => Ok(false),
        }
    }

    fn notify(&mut self, cart: &Cart) {
        for listener in &mut self.listeners {
            listener(cart);
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
