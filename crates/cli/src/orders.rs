//! Checkout and the client-side order list.

use thiserror::Error;

use atelier_core::order::{Order, OrderDraft, OrderError, ShippingAddress};
use atelier_core::shopping::{ShoppingStore, StateError, StateStorage};

use crate::api::{ApiClient, ApiError};

/// Errors raised during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart or address cannot form an order.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The storefront did not accept the order.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The order was placed but the emptied cart could not be saved.
    #[error("order placed but cart not cleared: {0}")]
    State(#[from] StateError),
}

/// The user's orders, newest first.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Replace the list with the orders stored on the server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` when not logged in.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<&[Order], ApiError> {
        let mut orders = api.orders().await?;
        orders.reverse();
        self.orders = orders;
        Ok(&self.orders)
    }

    /// Place an order for the current cart.
    ///
    /// The order is recorded locally and the cart cleared only after the
    /// storefront has accepted it. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::Order` if the cart is empty or the address incomplete
    /// - `CheckoutError::Api` if the storefront rejects the order
    /// - `CheckoutError::State` if the order went through but the cart could
    ///   not be persisted empty
    pub async fn create_order<S: StateStorage>(
        &mut self,
        api: &ApiClient,
        shopping: &mut ShoppingStore<S>,
        shipping_address: ShippingAddress,
    ) -> Result<Order, CheckoutError> {
        let draft = OrderDraft::from_cart(shopping.cart(), shipping_address);
        draft.validate()?;

        let order = api.create_order(&draft).await?;
        tracing::info!(order_id = %order.id, total = %order.total, "Order placed");

        self.orders.insert(0, order.clone());
        shopping.clear_cart()?;
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::shopping::MemoryStorage;
    use url::Url;

    use super::*;

    #[tokio::test]
    async fn test_empty_cart_fails_before_any_request() {
        // Nothing listens on port 9; a request would fail with ApiError.
        let api = ApiClient::new(Url::parse("http://127.0.0.1:9").unwrap());
        let mut shopping = ShoppingStore::open(MemoryStorage::new());
        let mut book = OrderBook::new();

        let result = book
            .create_order(&api, &mut shopping, ShippingAddress::default())
            .await;
        assert!(matches!(
            result,
            Err(CheckoutError::Order(OrderError::EmptyOrder))
        ));
        assert!(book.orders().is_empty());
    }
}
