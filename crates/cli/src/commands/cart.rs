//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! rs-cli show [--json]
//! rs-cli add <PRODUCT_ID>
//! rs-cli remove <PRODUCT_ID>
//! rs-cli update <PRODUCT_ID> <AMOUNT>
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_API_URL` - Base URL of the storefront API
//! - `STOREFRONT_STORAGE_DIR` - Where the cart is persisted

use std::fmt::Write as _;

use rocketshoes_core::{Cart, CurrencyCode, Price, ProductId};
use rocketshoes_storefront::UpdateProductAmount;

use super::{CliState, CommandError};

/// Print the current cart.
///
/// # Errors
///
/// Returns error if `json` is set and the cart cannot be serialized.
pub fn show(state: &CliState, json: bool) -> Result<(), CommandError> {
    let cart = state.cart().cart();
    if json {
        print_output(&serde_json::to_string_pretty(&cart)?);
    } else {
        print_output(&render(&cart));
    }
    Ok(())
}

/// Add one unit of `product_id` and print the cart.
///
/// # Errors
///
/// Returns the cart error if the product could not be added.
pub async fn add(state: &CliState, product_id: ProductId) -> Result<(), CommandError> {
    let cart = state.cart().add_product(product_id).await?;
    tracing::info!(
        "Added product {product_id} ({} in cart)",
        cart.amount_of(product_id)
    );
    print_output(&render(&cart));
    Ok(())
}

/// Remove `product_id` and print the cart.
///
/// # Errors
///
/// Returns the cart error if the cart could not be saved.
pub async fn remove(state: &CliState, product_id: ProductId) -> Result<(), CommandError> {
    let cart = state.cart().remove_product(product_id).await?;
    tracing::info!("Removed product {product_id}");
    print_output(&render(&cart));
    Ok(())
}

/// Set `product_id` to `amount` units and print the cart.
///
/// # Errors
///
/// Returns the cart error if the amount is invalid, exceeds stock, or the
/// update otherwise fails.
pub async fn update(
    state: &CliState,
    product_id: ProductId,
    amount: i64,
) -> Result<(), CommandError> {
    let cart = state
        .cart()
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await?;
    tracing::info!("Set product {product_id} to {amount}");
    print_output(&render(&cart));
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_output(text: &str) {
    println!("{text}");
}

/// Render the cart as a text table with line totals and subtotal.
fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty".to_string();
    }

    let currency = CurrencyCode::default();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:<40}  {:>12}  {:>4}  {:>12}",
        "ID", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"
    );
    for entry in cart.iter() {
        let _ = writeln!(
            out,
            "{:>6}  {:<40}  {:>12}  {:>4}  {:>12}",
            entry.id,
            truncate(&entry.title, 40),
            Price::new(entry.price, currency).to_string(),
            entry.amount,
            Price::new(entry.price, currency)
                .times(entry.amount.get())
                .to_string(),
        );
    }
    let _ = write!(
        out,
        "{} items, total {}",
        cart.total_quantity(),
        cart.subtotal(currency)
    );
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{CartEntry, Quantity};
    use rocketshoes_integration_tests::FakeStorefront;
    use rocketshoes_storefront::config::{DEFAULT_CART_KEY, StorageConfig};
    use rocketshoes_storefront::{CartError, StorefrontConfig};

    use super::*;
    use crate::commands::open_state;

    fn cart() -> Cart {
        vec![
            CartEntry {
                id: ProductId::new(1),
                title: "Tênis de Caminhada Leve Confortável".to_string(),
                price: "179.9".parse().unwrap(),
                image: "1.jpg".to_string(),
                amount: Quantity::try_from(2_i64).unwrap(),
            },
            CartEntry {
                id: ProductId::new(2),
                title: "Tênis VR Caminhada Confortável Detalhes Couro Masculino".to_string(),
                price: "139.9".parse().unwrap(),
                image: "2.jpg".to_string(),
                amount: Quantity::ONE,
            },
        ]
        .into()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Cart::new()), "Cart is empty");
    }

    #[test]
    fn test_render_totals() {
        let text = render(&cart());

        assert!(text.contains("R$ 359.80"));
        assert!(text.ends_with("3 items, total R$ 499.70"));
        assert_eq!(text.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_update_rejects_zero_amount() {
        let fake = FakeStorefront::spawn().await;
        fake.add_product(1, "Tênis", 179.9, 5);
        let dir = tempfile::tempdir().unwrap();
        let state = open_state(StorefrontConfig {
            api: fake.api_config(),
            storage: StorageConfig {
                dir: dir.path().to_path_buf(),
                cart_key: DEFAULT_CART_KEY.to_string(),
            },
            sentry_dsn: None,
        })
        .unwrap();

        add(&state, ProductId::new(1)).await.unwrap();
        let err = update(&state, ProductId::new(1), 0).await.unwrap_err();

        assert!(matches!(
            err,
            CommandError::Cart(CartError::InvalidAmount { .. })
        ));
        assert!(err.is_notified());
        assert_eq!(state.cart().cart().amount_of(ProductId::new(1)), 1);
        assert_eq!(fake.stock_hits(), 1);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
