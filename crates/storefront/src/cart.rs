//! Client-side cart state, synchronized against the remote order list.
//!
//! The remote Order Store is the single source of truth: one order per
//! product in the caller's cart. [`CartSynchronizer`] keeps a local,
//! derived view of that list, rebuilds it wholesale from the remote on
//! every change, and writes each rebuild through to a [`CartMirror`] so
//! the next activation can paint instantly.
//!
//! Consistency contract:
//!
//! - `refresh` replaces `items` atomically with whatever the remote
//!   returned; per-item catalog failures degrade to placeholder entries,
//!   an outer fetch failure degrades to an empty cart.
//! - `add_to_cart` never appends locally; it creates the remote order and
//!   re-fetches, so local state cannot drift ahead of the remote.
//! - `remove_from_cart` is the one local-only mutation: the deleted id was
//!   just confirmed by the remote, so dropping that entry cannot drift.
//! - Interleaved refreshes are last-write-wins; there is no generation
//!   token guarding against a stale response landing late.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use souq_core::{OrderId, Product, ProductId};
use tracing::{instrument, warn};

use crate::api::{OrderStore, ProductCatalog};
use crate::error::CartError;
use crate::mirror::CartMirror;

/// A local, derived, non-authoritative cart record: one remote order plus
/// the product snapshot resolved for it at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub order_id: OrderId,
    pub product: Product,
}

/// What an [`add_to_cart`](CartSynchronizer::add_to_cart) call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A remote order was created and the cart re-fetched.
    Added,
    /// The product was already in the cart (locally, or remotely via a
    /// duplicate-order conflict); the panel was opened to show it.
    AlreadyInCart,
    /// The remote create failed; the cart did not change. The caller owns
    /// surfacing this to the user.
    Unchanged,
}

/// Owns the in-memory cart and mirrors the remote order list into it.
pub struct CartSynchronizer {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductCatalog>,
    mirror: Arc<dyn CartMirror>,
    items: Vec<CartEntry>,
    panel_open: bool,
}

impl CartSynchronizer {
    /// Create a synchronizer with an empty cart.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn ProductCatalog>,
        mirror: Arc<dyn CartMirror>,
    ) -> Self {
        Self {
            orders,
            catalog,
            mirror,
            items: Vec::new(),
            panel_open: false,
        }
    }

    /// Current cart entries, in remote fetch order. Read-only; the only
    /// mutation paths are the operations on this type.
    #[must_use]
    pub fn items(&self) -> &[CartEntry] {
        &self.items
    }

    /// Whether the cart panel is open.
    #[must_use]
    pub const fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Paint the last mirrored snapshot before the first remote fetch.
    ///
    /// Purely cosmetic: the next [`refresh`](Self::refresh) overwrites
    /// whatever this loads.
    pub fn preload_from_mirror(&mut self) {
        if let Some(items) = self.mirror.load() {
            self.items = items;
        }
    }

    /// Rebuild `items` from the remote order list.
    ///
    /// Orders whose product cannot be resolved become placeholder entries
    /// rather than disappearing.
    ///
    /// # Errors
    ///
    /// Returns the outer fetch error; `items` is already emptied by then,
    /// so a failed refresh shows an empty cart rather than stale data.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), CartError> {
        let orders = match self.orders.list_orders().await {
            Ok(orders) => orders,
            Err(e) => {
                warn!("order fetch failed, emptying cart: {e}");
                self.replace_items(Vec::new());
                return Err(e.into());
            }
        };

        let mut items = Vec::with_capacity(orders.len());
        for order in orders {
            let product = match order.product.product_id() {
                Some(id) => match self.catalog.product_by_id(id).await {
                    Ok(product) => product,
                    Err(e) => {
                        warn!("product {id} did not resolve, using placeholder: {e}");
                        Product::unresolved(id.clone())
                    }
                },
                None => {
                    warn!("order {} carries no product reference", order.id);
                    // Placeholder id derived from the order, so two
                    // dangling orders never share a product id.
                    Product::unresolved(ProductId::new(format!("dangling-{}", order.id)))
                }
            };
            items.push(CartEntry {
                order_id: order.id,
                product,
            });
        }

        self.replace_items(items);
        Ok(())
    }

    /// Put a product in the cart.
    ///
    /// If the product is already present locally this is a no-op that
    /// opens the panel; no duplicate remote order is created. Otherwise a
    /// remote order is created and the cart re-fetched from the remote
    /// rather than appended locally. A duplicate-order conflict from the
    /// remote counts as success-after-the-fact.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&mut self, product: &Product) -> AddOutcome {
        if self.items.iter().any(|e| e.product.id == product.id) {
            self.panel_open = true;
            return AddOutcome::AlreadyInCart;
        }

        match self.orders.create_order(&product.id).await {
            Ok(_) => {
                // Rebuild from the authoritative source instead of
                // appending, so local state cannot drift.
                let _ = self.refresh().await;
                AddOutcome::Added
            }
            Err(e) if e.is_conflict() => {
                let _ = self.refresh().await;
                self.panel_open = true;
                AddOutcome::AlreadyInCart
            }
            Err(e) => {
                warn!("create order failed: {e}");
                AddOutcome::Unchanged
            }
        }
    }

    /// Remove the entry for `order_id` from the cart.
    ///
    /// On remote success the matching entry is dropped locally without a
    /// full refresh; the deleted id was just confirmed by the remote.
    /// Returns `Ok(false)` when the remote delete failed and the cart was
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownOrder`] if no local entry has that id.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn remove_from_cart(&mut self, order_id: &OrderId) -> Result<bool, CartError> {
        if !self.items.iter().any(|e| e.order_id == *order_id) {
            return Err(CartError::UnknownOrder(order_id.clone()));
        }

        match self.orders.delete_order(order_id).await {
            Ok(()) => {
                let mut items = std::mem::take(&mut self.items);
                items.retain(|e| e.order_id != *order_id);
                self.replace_items(items);
                Ok(true)
            }
            Err(e) => {
                warn!("delete order failed, keeping cart unchanged: {e}");
                Ok(false)
            }
        }
    }

    /// Empty the local cart.
    ///
    /// Remote orders are NOT deleted; the backend has no bulk-delete
    /// endpoint. Intended for flows like post-checkout where a separate
    /// order-placement step supersedes the cart's orders.
    pub fn clear_cart(&mut self) {
        self.replace_items(Vec::new());
    }

    /// Sum of entry prices. Placeholder entries contribute zero; an empty
    /// cart totals zero.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|e| e.product.price).sum()
    }

    /// Open the panel and refresh so it shows the latest remote state.
    ///
    /// The brief staleness between open and refresh completion is
    /// tolerated; a failed refresh already degrades to an empty cart.
    pub async fn open_panel(&mut self) {
        self.panel_open = true;
        let _ = self.refresh().await;
    }

    /// Flip the panel flag without forcing a refresh.
    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    /// Replace `items` wholesale and write the mirror through.
    fn replace_items(&mut self, items: Vec<CartEntry>) {
        self.items = items;
        if let Err(e) = self.mirror.save(&self.items) {
            warn!("cart mirror write failed: {e}");
        }
    }
}
