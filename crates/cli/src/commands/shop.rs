//! Cart and wishlist commands.
//!
//! The cart and the wishlist live in the state directory; only adding an item
//! needs the storefront, to fetch the product snapshot.

use atelier_cli::storage::FileStorage;
use atelier_core::Size;
use atelier_core::catalog::Product;
use atelier_core::shopping::ShoppingStore;

use super::{CommandError, CommandResult, Context, print_lines};

fn open(ctx: &Context) -> ShoppingStore<FileStorage> {
    ShoppingStore::open(ctx.storage.clone())
}

/// The product with `slug` among `products`.
fn find<'p>(mut products: impl Iterator<Item = &'p Product>, slug: &str) -> Option<&'p Product> {
    products.find(|p| p.slug == slug)
}

/// `atelier cart show`
pub fn show_cart(ctx: &Context) -> CommandResult {
    let store = open(ctx);
    if store.cart().is_empty() {
        return print_lines(["Your cart is empty"]);
    }

    let lines = store.cart().iter().map(|line| {
        format!(
            "{:<32} size {:<5} x{:<3} {:>10}",
            line.product.name,
            line.size.to_string(),
            line.quantity,
            line.line_total().to_string()
        )
    });
    print_lines(lines.chain([format!(
        "{} items, total {}",
        store.cart_items_count(),
        store.cart_total()
    )]))
}

/// `atelier cart add <slug> <size>`
pub async fn add_to_cart(ctx: &Context, slug: &str, size: Size) -> CommandResult {
    let product = ctx.api.product(slug).await?.product;
    if !product.sizes.is_empty() && !product.sizes.contains(&size) {
        return Err(CommandError::SizeUnavailable {
            product: product.name,
            size: size.to_string(),
        }
        .into());
    }

    let mut store = open(ctx);
    store.add_to_cart(&product, size)?;
    print_lines([format!(
        "Added {} (size {size}); {} items in cart",
        product.name,
        store.cart_items_count()
    )])
}

/// `atelier cart remove <slug>` - removes every size of the product.
pub fn remove_from_cart(ctx: &Context, slug: &str) -> CommandResult {
    let mut store = open(ctx);
    let id = find(store.cart().iter().map(|l| &l.product), slug)
        .map(|p| p.id.clone())
        .ok_or_else(|| CommandError::NotInCart(slug.to_owned()))?;

    store.remove_from_cart(&id)?;
    print_lines([format!("Removed {slug}")])
}

/// `atelier cart set <slug> <quantity>` - zero or less removes the product.
pub fn set_quantity(ctx: &Context, slug: &str, quantity: i64) -> CommandResult {
    let mut store = open(ctx);
    let id = find(store.cart().iter().map(|l| &l.product), slug)
        .map(|p| p.id.clone())
        .ok_or_else(|| CommandError::NotInCart(slug.to_owned()))?;

    store.update_cart_item_quantity(&id, quantity)?;
    print_lines([format!("Cart total {}", store.cart_total())])
}

/// `atelier cart clear`
pub fn clear_cart(ctx: &Context) -> CommandResult {
    open(ctx).clear_cart()?;
    print_lines(["Cart cleared"])
}

/// `atelier wishlist show`
pub fn show_wishlist(ctx: &Context) -> CommandResult {
    let store = open(ctx);
    if store.wishlist().is_empty() {
        return print_lines(["Your wishlist is empty"]);
    }
    print_lines(
        store
            .wishlist()
            .iter()
            .map(|p| format!("{:<32} {:>10}  {}", p.slug, p.base_price.to_string(), p.name)),
    )
}

/// `atelier wishlist add <slug>`
pub async fn add_to_wishlist(ctx: &Context, slug: &str) -> CommandResult {
    let product = ctx.api.product(slug).await?.product;
    let mut store = open(ctx);
    store.add_to_wishlist(&product)?;
    print_lines([format!(
        "{} wishlisted ({} items)",
        product.name,
        store.wishlist_items_count()
    )])
}

/// `atelier wishlist remove <slug>`
pub fn remove_from_wishlist(ctx: &Context, slug: &str) -> CommandResult {
    let mut store = open(ctx);
    let id = find(store.wishlist().iter(), slug)
        .map(|p| p.id.clone())
        .ok_or_else(|| CommandError::NotWishlisted(slug.to_owned()))?;

    store.remove_from_wishlist(&id)?;
    print_lines([format!("Removed {slug} from wishlist")])
}
