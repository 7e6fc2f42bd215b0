//! Order repository over the `orders` collection.

use atelier_core::UserId;
use atelier_core::order::Order;

use super::{DocumentStore, ORDERS, StoreError, decode_all};

/// Repository for placed orders. Orders are only ever appended.
pub struct OrderRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Append `order` to the collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the order cannot be encoded or written.
    pub async fn append(&self, order: &Order) -> Result<(), StoreError> {
        self.store
            .append(ORDERS, serde_json::to_value(order)?)
            .await
    }

    /// Orders placed by `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or decoded.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let orders: Vec<Order> = decode_all(ORDERS, self.store.read_all(ORDERS).await?)?;
        Ok(orders.into_iter().filter(|o| o.user_id == user_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use atelier_core::order::{OrderDraft, OrderItem, ShippingAddress};
    use atelier_core::{Price, ProductId, Size};

    use super::*;
    use crate::db::MemoryStore;

    fn order(user: i32, offset_ms: i64) -> Order {
        let item = OrderItem {
            product_id: ProductId::from("p1"),
            name: "Linen Shirt".to_owned(),
            size: Size::from(9),
            quantity: 1,
            price: Price::from_units(40),
            image: String::new(),
        };
        let draft = OrderDraft::from_items(vec![item], ShippingAddress::default());
        Order::place(
            draft,
            UserId::new(user),
            Utc::now() + Duration::milliseconds(offset_ms),
        )
    }

    #[tokio::test]
    async fn test_list_filters_by_owner() {
        let store = MemoryStore::new();
        let repo = OrderRepository::new(&store);

        repo.append(&order(1, 0)).await.unwrap();
        repo.append(&order(2, 1)).await.unwrap();
        repo.append(&order(1, 2)).await.unwrap();

        let mine = repo.list_for_user(UserId::new(1)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.user_id == UserId::new(1)));
        assert!(repo.list_for_user(UserId::new(3)).await.unwrap().is_empty());
    }
}
