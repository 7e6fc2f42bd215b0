//! Order assembly.
//!
//! Checkout turns a cart snapshot and a shipping address into an
//! [`OrderDraft`] (denormalized items plus computed totals). The storefront
//! re-checks the draft, then [`Order::place`] stamps identity, status and
//! creation time before the order is appended to the order collection.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shopping::CartLine;
use crate::types::{OrderId, OrderStatus, Price, ProductId, Size, UserId};

/// Subtotal from which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Price = Price::new(Decimal::ONE_HUNDRED);

/// Shipping charged below [`FREE_SHIPPING_THRESHOLD`].
pub const FLAT_SHIPPING_FEE: Price = Price::new(Decimal::TEN);

/// Errors raised while assembling or placing an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order has no items")]
    EmptyOrder,

    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    #[error("{field} mismatch: expected {expected}, got {found}")]
    TotalsMismatch {
        field: &'static str,
        expected: Price,
        found: Price,
    },

    #[error("shipping address is missing {0}")]
    IncompleteAddress(&'static str),

    /// The order could not be persisted. Nothing was recorded.
    #[error("failed to create order: {0}")]
    OrderCreationFailed(String),
}

/// Where an order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Name of the first blank field, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("fullName", &self.full_name),
            ("streetAddress", &self.street_address),
            ("city", &self.city),
            ("state", &self.state),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// A denormalized order line. Later catalog edits do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub size: Size,
    pub quantity: u32,
    /// Unit price at checkout.
    pub price: Price,
    /// First product image URL, empty if the product had none.
    pub image: String,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.clone(),
            name: line.product.name.clone(),
            size: line.size,
            quantity: line.quantity,
            price: line.product.base_price,
            image: line
                .product
                .primary_image_url()
                .unwrap_or_default()
                .to_owned(),
        }
    }
}

/// Shipping charged for a given subtotal.
#[must_use]
pub fn shipping_for(subtotal: Price) -> Price {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Price::ZERO
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// An order as submitted at checkout, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderDraft {
    /// Snapshot `lines` and compute totals.
    #[must_use]
    pub fn from_cart(lines: &[CartLine], shipping_address: ShippingAddress) -> Self {
        Self::from_items(lines.iter().map(OrderItem::from).collect(), shipping_address)
    }

    /// Compute totals for already denormalized items.
    #[must_use]
    pub fn from_items(items: Vec<OrderItem>, shipping_address: ShippingAddress) -> Self {
        let subtotal: Price = items.iter().map(OrderItem::line_total).sum();
        let shipping = shipping_for(subtotal);
        Self {
            items,
            shipping_address,
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Check the draft is placeable and its totals match its items.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyOrder`] for an order without items
    /// - [`OrderError::InvalidQuantity`] for a zero-quantity line
    /// - [`OrderError::IncompleteAddress`] for a blank address field
    /// - [`OrderError::TotalsMismatch`] when submitted totals disagree with
    ///   the ones recomputed from the items, compared in whole cents
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(OrderError::InvalidQuantity(item.product_id.clone()));
        }
        if let Some(field) = self.shipping_address.missing_field() {
            return Err(OrderError::IncompleteAddress(field));
        }

        let expected = Self::from_items(self.items.clone(), self.shipping_address.clone());
        for (field, expected, found) in [
            ("subtotal", expected.subtotal, self.subtotal),
            ("shipping", expected.shipping, self.shipping),
            ("total", expected.total, self.total),
        ] {
            let (expected, found) = (expected.to_cents(), found.to_cents());
            if expected != found {
                return Err(OrderError::TotalsMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Give `draft` an identity: `ord_<millis>`, pending, created `now`.
    ///
    /// Totals are recomputed from the items and rounded to cents; the ones
    /// the client submitted are only checked by [`OrderDraft::validate`].
    #[must_use]
    pub fn place(draft: OrderDraft, user_id: UserId, now: DateTime<Utc>) -> Self {
        let settled = OrderDraft::from_items(draft.items, draft.shipping_address);
        Self {
            id: OrderId::from_timestamp(now),
            user_id,
            items: settled.items,
            subtotal: settled.subtotal.to_cents(),
            shipping: settled.shipping,
            total: settled.total.to_cents(),
            status: OrderStatus::Pending,
            shipping_address: settled.shipping_address,
            created_at: now,
        }
    }
}
