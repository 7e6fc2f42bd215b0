//! Cart and wishlist state with derived totals.
//!
//! [`ShoppingState`] is the pure model: a list of cart lines and a list of
//! wishlisted products, mutated by explicit operations. [`ShoppingStore`]
//! owns one state plus a [`StateStorage`] and mirrors every mutation to it,
//! the way a browser mirrors to local storage. The application shell builds
//! the store and hands out `&mut` access; there is no global instance.
//!
//! Persisted layout: two independent JSON arrays under [`CART_KEY`] and
//! [`WISHLIST_KEY`].

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Product;
use crate::types::{Price, ProductId, Size};

/// Storage key of the serialized cart.
pub const CART_KEY: &str = "cart";
/// Storage key of the serialized wishlist.
pub const WISHLIST_KEY: &str = "wishlist";

/// Errors raised while persisting shopping state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value persistence for shopping state.
///
/// Values are opaque strings; the store decides the encoding.
pub trait StateStorage {
    /// Read the value under `key`, `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the backing medium cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StateError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the backing medium cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StateError>;
}

/// In-process [`StateStorage`], used by tests and short-lived shells.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, e.g. to simulate state left by a previous session.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    /// The raw value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One cart row: a product snapshot, the chosen size and a quantity.
///
/// Lines are unique by `(product.id, size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub size: Size,
    pub quantity: u32,
}

impl CartLine {
    /// `basePrice × quantity`. Compare-at pricing is ignored.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.base_price.times(self.quantity)
    }

    fn matches(&self, id: &ProductId, size: Size) -> bool {
        &self.product.id == id && self.size == size
    }
}

/// The pure cart and wishlist model.
///
/// Mutators return whether anything changed so callers can skip
/// redundant writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingState {
    cart: Vec<CartLine>,
    wishlist: Vec<Product>,
}

impl ShoppingState {
    /// Build a state from previously saved collections.
    #[must_use]
    pub const fn from_parts(cart: Vec<CartLine>, wishlist: Vec<Product>) -> Self {
        Self { cart, wishlist }
    }

    #[must_use]
    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &[Product] {
        &self.wishlist
    }

    /// Add one unit of `product` in `size`.
    ///
    /// An existing `(id, size)` line is incremented; otherwise a line with
    /// quantity 1 is appended. Quantities are not capped.
    pub fn add_to_cart(&mut self, product: &Product, size: Size) -> bool {
        if let Some(line) = self.cart.iter_mut().find(|l| l.matches(&product.id, size)) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.cart.push(CartLine {
                product: product.clone(),
                size,
                quantity: 1,
            });
        }
        true
    }

    /// Remove every line of `product_id`, whatever the size.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> bool {
        let before = self.cart.len();
        self.cart.retain(|line| &line.product.id != product_id);
        self.cart.len() != before
    }

    /// Set the quantity of every line of `product_id`, whatever the size.
    ///
    /// A quantity of zero or below removes those lines. Line quantities are
    /// `u32`, so anything above `u32::MAX` is stored as `u32::MAX`.
    pub fn update_cart_item_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        let quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }

        let mut changed = false;
        for line in self.cart.iter_mut().filter(|l| &l.product.id == product_id) {
            changed |= line.quantity != quantity;
            line.quantity = quantity;
        }
        changed
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) -> bool {
        let changed = !self.cart.is_empty();
        self.cart.clear();
        changed
    }

    /// Add `product` unless a product with the same id is already listed.
    pub fn add_to_wishlist(&mut self, product: &Product) -> bool {
        if self.is_wishlisted(&product.id) {
            return false;
        }
        self.wishlist.push(product.clone());
        true
    }

    /// Remove `product_id` from the wishlist. Absent ids are a no-op.
    pub fn remove_from_wishlist(&mut self, product_id: &ProductId) -> bool {
        let before = self.wishlist.len();
        self.wishlist.retain(|p| &p.id != product_id);
        self.wishlist.len() != before
    }

    #[must_use]
    pub fn is_wishlisted(&self, product_id: &ProductId) -> bool {
        self.wishlist.iter().any(|p| &p.id == product_id)
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn cart_items_count(&self) -> u64 {
        self.cart.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn wishlist_items_count(&self) -> usize {
        self.wishlist.len()
    }

    /// Sum of `basePrice × quantity` over the cart.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.cart.iter().map(CartLine::line_total).sum()
    }
}

/// A [`ShoppingState`] mirrored to a [`StateStorage`] after every mutation.
///
/// A failed write is reported to the caller; the in-memory change is kept so
/// the session can continue and the next successful write catches up.
#[derive(Debug)]
pub struct ShoppingStore<S: StateStorage> {
    state: ShoppingState,
    storage: S,
}

impl<S: StateStorage> ShoppingStore<S> {
    /// Load both collections from `storage`.
    ///
    /// Missing keys start empty. Unreadable or malformed values are logged
    /// and also start empty.
    pub fn open(storage: S) -> Self {
        let cart = load_collection(&storage, CART_KEY);
        let wishlist = load_collection(&storage, WISHLIST_KEY);
        Self {
            state: ShoppingState::from_parts(cart, wishlist),
            storage,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ShoppingState {
        &self.state
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn cart(&self) -> &[CartLine] {
        self.state.cart()
    }

    #[must_use]
    pub fn wishlist(&self) -> &[Product] {
        self.state.wishlist()
    }

    #[must_use]
    pub fn cart_items_count(&self) -> u64 {
        self.state.cart_items_count()
    }

    #[must_use]
    pub fn wishlist_items_count(&self) -> usize {
        self.state.wishlist_items_count()
    }

    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.state.cart_total()
    }

    /// See [`ShoppingState::add_to_cart`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn add_to_cart(&mut self, product: &Product, size: Size) -> Result<(), StateError> {
        if self.state.add_to_cart(product, size) {
            self.save_cart()?;
        }
        Ok(())
    }

    /// See [`ShoppingState::remove_from_cart`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<(), StateError> {
        if self.state.remove_from_cart(product_id) {
            self.save_cart()?;
        }
        Ok(())
    }

    /// See [`ShoppingState::update_cart_item_quantity`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn update_cart_item_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), StateError> {
        if self.state.update_cart_item_quantity(product_id, quantity) {
            self.save_cart()?;
        }
        Ok(())
    }

    /// Empty the cart, typically after a confirmed checkout.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), StateError> {
        if self.state.clear_cart() {
            self.save_cart()?;
        }
        Ok(())
    }

    /// See [`ShoppingState::add_to_wishlist`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the wishlist cannot be persisted.
    pub fn add_to_wishlist(&mut self, product: &Product) -> Result<(), StateError> {
        if self.state.add_to_wishlist(product) {
            self.save_wishlist()?;
        }
        Ok(())
    }

    /// See [`ShoppingState::remove_from_wishlist`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the wishlist cannot be persisted.
    pub fn remove_from_wishlist(&mut self, product_id: &ProductId) -> Result<(), StateError> {
        if self.state.remove_from_wishlist(product_id) {
            self.save_wishlist()?;
        }
        Ok(())
    }

    fn save_cart(&mut self) -> Result<(), StateError> {
        let json = serde_json::to_string(self.state.cart())?;
        self.storage.save(CART_KEY, &json)
    }

    fn save_wishlist(&mut self) -> Result<(), StateError> {
        let json = serde_json::to_string(self.state.wishlist())?;
        self.storage.save(WISHLIST_KEY, &json)
    }
}

fn load_collection<S: StateStorage, T: DeserializeOwned>(storage: &S, key: &str) -> Vec<T> {
    match storage.load(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Discarding malformed shopping state");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read shopping state");
            Vec::new()
        }
    }
}
