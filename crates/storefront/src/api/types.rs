//! Wire types for the remote storefront API.
//!
//! The backend returns loosely shaped JSON: an order's `product` field is
//! sometimes a bare id and sometimes an embedded partial object, list
//! endpoints sometimes wrap their payload in `{ "data": [...] }`, and
//! product names may only exist as a localized `title`. All of that
//! ambiguity is normalized here, at the API boundary, so nothing above
//! this module sees it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use souq_core::{BannerId, CategoryId, FavoriteId, OrderId, Product, ProductId, UserId};

// =============================================================================
// Orders
// =============================================================================

/// An order as stored remotely: one product in the caller's cart.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteOrder {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub product: ProductRef,
}

/// The order's product reference, in either of the two shapes the backend
/// emits.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    /// Bare product id.
    Id(ProductId),
    /// Embedded partial product object.
    Embedded(PartialProduct),
}

impl ProductRef {
    /// The referenced product id, if the payload carried one at all.
    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Embedded(partial) => partial.product_id(),
        }
    }
}

/// Partial product object embedded in an order. The id may be under `_id`
/// or `id` depending on which backend path produced the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialProduct {
    #[serde(rename = "_id", default)]
    mongo_id: Option<ProductId>,
    #[serde(rename = "id", default)]
    plain_id: Option<ProductId>,
}

impl PartialProduct {
    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        self.mongo_id.as_ref().or(self.plain_id.as_ref())
    }
}

// =============================================================================
// Products
// =============================================================================

/// A product as the catalog returns it, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<LocalizedText>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<Vec<ProductImage>>,
}

/// Localized product title.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub ar: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
}

/// Hosted product image reference.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub public_id: Option<String>,
    pub url: String,
}

impl ProductPayload {
    /// Flatten the wire shape into the normalized [`Product`] snapshot.
    ///
    /// Name resolution order: `name`, then the Arabic `title`, then the
    /// unresolved-product placeholder. Missing price normalizes to zero,
    /// and the first image URL wins.
    #[must_use]
    pub fn into_product(self) -> Product {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .or_else(|| self.title.and_then(|t| t.ar).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| souq_core::UNRESOLVED_PRODUCT_NAME.to_string());
        let image = self
            .image
            .and_then(|images| images.into_iter().next())
            .map(|img| img.url)
            .unwrap_or_default();

        Product::new(self.id, name, self.price.unwrap_or_default(), image)
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// List payload, either bare or wrapped in `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// User payload, wrapped under `user`, `data`, or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserEnvelope {
    User { user: User },
    Data { data: User },
    Bare(User),
}

impl UserEnvelope {
    #[must_use]
    pub fn into_user(self) -> User {
        match self {
            Self::User { user } | Self::Data { data: user } | Self::Bare(user) => user,
        }
    }
}

// =============================================================================
// Other resources
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<CategoryId>,
}

/// A favorite as stored remotely, shaped like an order.
#[derive(Debug, Clone, Deserialize)]
pub struct Favorite {
    #[serde(rename = "_id")]
    pub id: FavoriteId,
    pub product: ProductRef,
}

/// Hero banner shown on the home page.
#[derive(Debug, Clone, Deserialize)]
pub struct HeroBanner {
    #[serde(rename = "_id")]
    pub id: BannerId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Authenticated user profile.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Partial profile update. Only the fields that are set travel in the
/// body; the rest of the profile is left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Response from `register`/`login`. The token is the part the client
/// cares about; anything else is tolerated and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}
