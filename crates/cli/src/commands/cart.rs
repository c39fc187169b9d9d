//! Cart commands over the file-backed storage area.
//!
//! # Usage
//!
//! ```bash
//! tp-cli cart add sport-chrono
//! tp-cli cart set sport-chrono 2
//! tp-cli cart show
//! tp-cli cart checkout
//! ```
//!
//! # Environment Variables
//!
//! - `TIMEPIECE_STORAGE_PATH` - Storage file shared by every invocation
//! - `TIMEPIECE_CART_KEY` - Key of the cart inside the storage file
//! - `TIMEPIECE_CATALOG_PATH` - Catalog used by `cart add`

use tracing::{info, warn};

use timepiece_core::{Cart, Price, ProductId};
use timepiece_storefront::storage::FileStorage;
use timepiece_storefront::{ActionOutcome, CartAction, CartStore, CartView, StorefrontConfig};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// The cart store for one CLI invocation.
pub struct CartSession<'a> {
    config: &'a StorefrontConfig,
    store: CartStore<FileStorage>,
}

impl<'a> CartSession<'a> {
    /// Open the cart in the configured storage file.
    #[must_use]
    pub fn open(config: &'a StorefrontConfig) -> Self {
        let storage = FileStorage::new(&config.storage_path).with_quota(config.storage_quota);
        Self {
            config,
            store: CartStore::with_key(storage, config.cart_key.clone()),
        }
    }

    /// Print the cart and its order summary.
    pub fn show(&self) -> CommandResult {
        let cart = self.store.read()?;
        let view = CartView::build(&cart, &self.config.pricing, self.config.currency);

        if view.is_empty() {
            info!("Your cart is empty.");
            return Ok(());
        }

        for item in &view.items {
            info!(
                "{} x{}  {} @ {} = {}",
                item.id, item.quantity, item.name, item.price, item.line_total
            );
        }
        info!("Items:    {}", view.item_count);
        info!("Subtotal: {}", view.summary.subtotal);
        info!("Shipping: {}", view.summary.shipping);
        info!("Tax:      {}", view.summary.tax);
        info!("Total:    {}", view.summary.total);
        Ok(())
    }

    /// Add one unit of a catalog product.
    pub fn add(&mut self, id: &str) -> CommandResult {
        let id = ProductId::parse(id)?;
        let catalog = super::catalog(self.config)?;
        let product = catalog
            .get(&id)
            .ok_or_else(|| format!("Unknown product: {id}"))?
            .clone();
        let name = product.name.clone();

        let cart = self.updated(CartAction::Add(product))?;
        info!("{name} added to cart ({} in cart)", quantity_of(&cart, &id));
        Ok(())
    }

    /// Remove a product from the cart.
    pub fn remove(&mut self, id: &str) -> CommandResult {
        let id = ProductId::parse(id)?;
        if self.store.read()?.get(&id).is_none() {
            warn!(%id, "Product is not in the cart");
            return Ok(());
        }
        self.updated(CartAction::Remove(id.clone()))?;
        info!("{id} removed from cart");
        Ok(())
    }

    /// Set the quantity of a product in the cart.
    pub fn set(&mut self, id: &str, quantity: &str) -> CommandResult {
        let id = ProductId::parse(id)?;
        let action = CartAction::SetQuantity {
            id: id.clone(),
            input: quantity.to_string(),
        };
        match self.store.dispatch(action, &self.config.pricing)? {
            ActionOutcome::Ignored => Err(format!("Invalid quantity: {quantity}").into()),
            ActionOutcome::Updated(cart) => {
                self.report_quantity(&cart, &id);
                Ok(())
            }
            outcome => Err(format!("Unexpected outcome: {outcome:?}").into()),
        }
    }

    /// Add one unit to a product in the cart.
    pub fn increase(&mut self, id: &str) -> CommandResult {
        let id = ProductId::parse(id)?;
        let cart = self.updated(CartAction::Increase(id.clone()))?;
        self.report_quantity(&cart, &id);
        Ok(())
    }

    /// Take one unit off a product in the cart.
    pub fn decrease(&mut self, id: &str) -> CommandResult {
        let id = ProductId::parse(id)?;
        let cart = self.updated(CartAction::Decrease(id.clone()))?;
        self.report_quantity(&cart, &id);
        Ok(())
    }

    /// Empty the cart.
    pub fn clear(&mut self) -> CommandResult {
        self.store.clear()?;
        info!("Cart cleared");
        Ok(())
    }

    /// Place the order and empty the cart.
    pub fn checkout(&mut self) -> CommandResult {
        let outcome = self.store.dispatch(CartAction::Checkout, &self.config.pricing)?;
        let notice = outcome.notice().unwrap_or_default();
        match outcome {
            ActionOutcome::OrderPlaced(summary) => {
                info!("{notice}");
                info!(
                    "Charged {}",
                    Price::new(summary.total, self.config.currency)
                );
            }
            _ => warn!("{notice}"),
        }
        Ok(())
    }

    fn updated(&mut self, action: CartAction) -> Result<Cart, Box<dyn std::error::Error>> {
        match self.store.dispatch(action, &self.config.pricing)? {
            ActionOutcome::Updated(cart) => Ok(cart),
            outcome => Err(format!("Unexpected outcome: {outcome:?}").into()),
        }
    }

    fn report_quantity(&self, cart: &Cart, id: &ProductId) {
        match cart.get(id) {
            Some(item) => info!("{id}: quantity {}", item.quantity),
            None => warn!(%id, "Product is not in the cart"),
        }
        info!(
            "Total: {}",
            Price::new(cart.subtotal(), self.config.currency)
        );
    }
}

fn quantity_of(cart: &Cart, id: &ProductId) -> u32 {
    cart.get(id).map_or(0, |item| item.quantity.get())
}
