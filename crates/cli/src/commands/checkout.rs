//! Checkout and order history commands.

use atelier_cli::orders::OrderBook;
use atelier_core::order::ShippingAddress;
use atelier_core::shopping::ShoppingStore;

use super::{CommandResult, Context, print_lines};

/// `atelier checkout` - place an order for the whole cart.
pub async fn checkout(ctx: &Context, address: ShippingAddress) -> CommandResult {
    let mut shopping = ShoppingStore::open(ctx.storage.clone());
    let mut book = OrderBook::new();

    let order = book.create_order(&ctx.api, &mut shopping, address).await?;
    print_lines([
        format!("Order {} placed ({})", order.id, order.status),
        format!(
            "subtotal {}  shipping {}  total {}",
            order.subtotal, order.shipping, order.total
        ),
    ])
}

/// `atelier orders` - newest first.
pub async fn orders(ctx: &Context) -> CommandResult {
    let mut book = OrderBook::new();
    let orders = book.refresh(&ctx.api).await?;
    if orders.is_empty() {
        return print_lines(["No orders yet"]);
    }

    print_lines(orders.iter().map(|o| {
        format!(
            "{}  {}  {:<10} {:>3} items  {}",
            o.id,
            o.created_at.format("%Y-%m-%d %H:%M"),
            o.status.to_string(),
            o.items.iter().map(|i| u64::from(i.quantity)).sum::<u64>(),
            o.total
        )
    }))
}
