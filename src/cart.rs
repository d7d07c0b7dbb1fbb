//! Guest shopping cart.
//!
//! The cart lives entirely in local storage under [`GUEST_CART_KEY`]. Every
//! change goes through [`cart_reducer`], which re-derives line totals and
//! cart aggregates from the items on each transition, so `totalItems`,
//! `subtotal` and `total` always equal a fold over the lines. A transition
//! whose totals would leave the representable range is refused.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    error::{ClientError, ClientResult},
    models::{Product, ProductStatus},
    money::Money,
    storage::{GUEST_CART_KEY, SharedStore},
};

/// A quantity or amount total that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cart totals out of range")]
pub struct CartOverflow;

/// Denormalized product fields kept on a cart line for display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product
                .image
                .clone()
                .or_else(|| product.images.first().cloned()),
            category: product.category.clone(),
            status: product.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "CartItemRecord")]
pub struct CartItem {
    product_id: i64,
    product: ProductSnapshot,
    quantity: u32,
    price: Money,
    total: Money,
}

/// Stored shape of a line; `total` is ignored and re-derived on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemRecord {
    product_id: i64,
    product: ProductSnapshot,
    quantity: u32,
    price: Money,
}

impl TryFrom<CartItemRecord> for CartItem {
    type Error = String;

    fn try_from(record: CartItemRecord) -> Result<Self, Self::Error> {
        if record.quantity == 0 {
            return Err(format!(
                "cart line for product {} has zero quantity",
                record.product_id
            ));
        }
        let product_id = record.product_id;
        CartItem::new(product_id, record.product, record.quantity, record.price)
            .map_err(|err| format!("cart line for product {product_id}: {err}"))
    }
}

impl CartItem {
    pub fn new(
        product_id: i64,
        product: ProductSnapshot,
        quantity: u32,
        price: Money,
    ) -> Result<Self, CartOverflow> {
        let total = price.checked_times(quantity).ok_or(CartOverflow)?;
        Ok(Self {
            product_id,
            product,
            quantity,
            price,
            total,
        })
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn total(&self) -> Money {
        self.total
    }

    fn with_quantity(&self, quantity: u32) -> Result<Self, CartOverflow> {
        Self::new(self.product_id, self.product.clone(), quantity, self.price)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "CartRecord")]
pub struct Cart {
    items: Vec<CartItem>,
    total_items: u32,
    subtotal: Money,
    total: Money,
}

#[derive(Deserialize)]
struct CartRecord {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl TryFrom<CartRecord> for Cart {
    type Error = CartOverflow;

    fn try_from(record: CartRecord) -> Result<Self, Self::Error> {
        Cart::from_items(record.items)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

impl Cart {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            subtotal: Money::ZERO,
            total: Money::ZERO,
        }
    }

    /// Builds a cart whose aggregates are a fold over `items`.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartOverflow> {
        let total_items = items
            .iter()
            .try_fold(0u32, |acc, item| acc.checked_add(item.quantity))
            .ok_or(CartOverflow)?;
        let subtotal =
            Money::checked_sum(items.iter().map(CartItem::total)).ok_or(CartOverflow)?;
        Ok(Self {
            items,
            total_items,
            subtotal,
            total: subtotal,
        })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, product_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    AddItem {
        product: ProductSnapshot,
        quantity: u32,
    },
    UpdateItem {
        product_id: i64,
        quantity: u32,
    },
    RemoveItem {
        product_id: i64,
    },
    ClearCart,
    SetCart(Option<Cart>),
}

/// Pure transition function over the guest cart.
///
/// Adding a product already in the cart increments that line at its
/// existing unit price. Updating or removing an unknown product leaves the
/// cart as it was. Quantity bounds are the caller's concern; a transition
/// that would overflow the cart totals leaves the state unchanged.
pub fn cart_reducer(state: Option<Cart>, action: CartAction) -> Option<Cart> {
    match try_reduce(state.as_ref(), action) {
        Ok(next) => next,
        Err(err) => {
            tracing::warn!(error = %err, "cart action refused");
            state
        }
    }
}

/// Like [`cart_reducer`], but reports an overflowing transition instead of
/// ignoring it.
pub fn try_reduce(
    state: Option<&Cart>,
    action: CartAction,
) -> Result<Option<Cart>, CartOverflow> {
    match action {
        CartAction::AddItem { product, quantity } => {
            let mut items = state.map(|cart| cart.items.clone()).unwrap_or_default();
            match items.iter_mut().find(|item| item.product_id == product.id) {
                Some(existing) => {
                    let quantity = existing
                        .quantity
                        .checked_add(quantity)
                        .ok_or(CartOverflow)?;
                    *existing = existing.with_quantity(quantity)?;
                }
                None => {
                    let price = product.price;
                    items.push(CartItem::new(product.id, product, quantity, price)?);
                }
            }
            Cart::from_items(items).map(Some)
        }
        CartAction::UpdateItem {
            product_id,
            quantity,
        } => state
            .map(|cart| {
                let items = cart
                    .items
                    .iter()
                    .map(|item| {
                        if item.product_id == product_id {
                            item.with_quantity(quantity)
                        } else {
                            Ok(item.clone())
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Cart::from_items(items)
            })
            .transpose(),
        CartAction::RemoveItem { product_id } => state
            .map(|cart| {
                let items = cart
                    .items
                    .iter()
                    .filter(|item| item.product_id != product_id)
                    .cloned()
                    .collect();
                Cart::from_items(items)
            })
            .transpose(),
        CartAction::ClearCart => Ok(Some(Cart::empty())),
        CartAction::SetCart(cart) => Ok(cart),
    }
}

/// Single-writer owner of the guest cart: applies actions through
/// [`try_reduce`] and persists the result after every mutation.
pub struct CartStore {
    store: SharedStore,
    state: Mutex<Option<Cart>>,
}

impl CartStore {
    /// Loads the stored cart. A missing or malformed entry yields an empty cart.
    pub async fn load(store: SharedStore) -> ClientResult<Self> {
        let cart = match store.get(GUEST_CART_KEY).await? {
            Some(raw) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "stored cart is malformed, starting empty");
                Cart::empty()
            }),
            None => Cart::empty(),
        };
        Ok(Self {
            store,
            state: Mutex::new(Some(cart)),
        })
    }

    pub async fn cart(&self) -> Cart {
        self.state.lock().await.clone().unwrap_or_default()
    }

    /// Applies `action`, persists the result, and only then makes it the
    /// current cart. On any error the current cart is left as it was.
    pub async fn dispatch(&self, action: CartAction) -> ClientResult<Cart> {
        let mut state = self.state.lock().await;
        let requested = match &action {
            CartAction::AddItem { quantity, .. } | CartAction::UpdateItem { quantity, .. } => {
                Some(*quantity)
            }
            _ => None,
        };
        let next = try_reduce(state.as_ref(), action).map_err(|err| match requested {
            Some(quantity) => ClientError::InvalidQuantity(quantity),
            None => ClientError::BadRequest(err.to_string()),
        })?;
        let cart = next.clone().unwrap_or_default();
        let raw = serde_json::to_string(&cart)?;
        self.store.set(GUEST_CART_KEY, raw).await?;
        *state = next;
        Ok(cart)
    }

    pub async fn add_to_cart(&self, product: &Product, quantity: u32) -> ClientResult<Cart> {
        if quantity == 0 {
            return Err(ClientError::InvalidQuantity(quantity));
        }
        if !product.status.is_purchasable() {
            return Err(ClientError::BadRequest(format!(
                "{} is {}",
                product.name,
                product.status.label().to_lowercase()
            )));
        }
        tracing::debug!(product_id = product.id, quantity, "adding to guest cart");
        self.dispatch(CartAction::AddItem {
            product: ProductSnapshot::from(product),
            quantity,
        })
        .await
    }

    pub async fn update_quantity(&self, product_id: i64, quantity: u32) -> ClientResult<Cart> {
        if quantity == 0 {
            return Err(ClientError::InvalidQuantity(quantity));
        }
        self.dispatch(CartAction::UpdateItem {
            product_id,
            quantity,
        })
        .await
    }

    pub async fn remove_from_cart(&self, product_id: i64) -> ClientResult<Cart> {
        self.dispatch(CartAction::RemoveItem { product_id }).await
    }

    pub async fn clear_cart(&self) -> ClientResult<Cart> {
        self.dispatch(CartAction::ClearCart).await
    }

    pub async fn item_count(&self) -> u32 {
        self.state
            .lock()
            .await
            .as_ref()
            .map(Cart::total_items)
            .unwrap_or(0)
    }

    pub async fn is_in_cart(&self, product_id: i64) -> bool {
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|cart| cart.item(product_id).is_some())
    }
}
