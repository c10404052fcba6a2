//! REST client for the remote storefront API.
//!
//! # Architecture
//!
//! - The remote API is the source of truth - no local sync, direct calls
//! - Product lookups are cached in-memory via `moka` (5 minute TTL)
//! - The cart consumes the API through the [`OrderStore`] and
//!   [`ProductCatalog`] traits so tests can substitute fakes
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use souq_storefront::api::ApiClient;
//! use souq_storefront::config::ApiConfig;
//! use souq_storefront::session::SessionTokens;
//!
//! let session = Arc::new(SessionTokens::new());
//! let client = ApiClient::new(&ApiConfig::from_env()?, session)?;
//!
//! let products = client.list_products().await?;
//! let orders = client.list_orders().await?;
//! ```

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use souq_core::{CategoryId, FavoriteId, OrderId, Product, ProductId, UserId};
use tracing::{debug, instrument, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::session::CredentialProvider;

use types::{
    AuthResponse, Category, Favorite, HeroBanner, ListEnvelope, ProductPayload, RemoteOrder, User,
    UserEnvelope, UserUpdate,
};

/// Remote CRUD over the caller's orders.
///
/// Each order references exactly one product and belongs to the caller
/// identified by the ambient bearer credential.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// List the caller's orders.
    async fn list_orders(&self) -> Result<Vec<RemoteOrder>, ApiError>;

    /// Create an order for a product. Fails with [`ApiError::Conflict`]
    /// when an order for that product already exists for the caller.
    async fn create_order(&self, product_id: &ProductId) -> Result<RemoteOrder, ApiError>;

    /// Delete an order by id.
    async fn delete_order(&self, order_id: &OrderId) -> Result<(), ApiError>;
}

/// Read-only product lookup by id.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Resolve full product details. Fails with [`ApiError::NotFound`]
    /// if the id does not exist.
    async fn product_by_id(&self, id: &ProductId) -> Result<Product, ApiError>;
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote storefront API.
///
/// Cheaply cloneable; product lookups are cached for 5 minutes.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: ApiConfig,
    credentials: Arc<dyn CredentialProvider>,
    product_cache: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(
        config: &ApiConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                config: config.clone(),
                credentials,
                product_cache,
            }),
        })
    }

    /// Attach the bearer credential, failing before any network round-trip
    /// when none is held.
    fn authed(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        let token = self
            .inner
            .credentials
            .bearer_token()
            .ok_or_else(|| ApiError::Unauthorized("no bearer credential held".to_string()))?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    fn endpoint(&self, path: &str) -> String {
        self.inner.config.endpoint(path)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List all products.
    ///
    /// Tolerates both the bare-array and `{ "data": [...] }` response
    /// shapes; any other shape degrades to an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails outright.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("product"))
            .send()
            .await?;

        let value: serde_json::Value = read_json(response).await?;
        match serde_json::from_value::<ListEnvelope<ProductPayload>>(value) {
            Ok(envelope) => Ok(envelope
                .into_vec()
                .into_iter()
                .map(ProductPayload::into_product)
                .collect()),
            Err(_) => {
                warn!("product list response is not an array, returning empty list");
                Ok(Vec::new())
            }
        }
    }

    /// Search products by name. Failures degrade to an empty result list.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_products(&self, query: &str) -> Vec<Product> {
        let request = self
            .inner
            .client
            .get(self.endpoint("search/"))
            .query(&[("name", query)]);

        let result: Result<ListEnvelope<ProductPayload>, ApiError> = async {
            let response = request.send().await?;
            read_json(response).await
        }
        .await;

        match result {
            Ok(envelope) => envelope
                .into_vec()
                .into_iter()
                .map(ProductPayload::into_product)
                .collect(),
            Err(e) => {
                warn!("product search failed: {e}");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("category"))
            .send()
            .await?;

        let envelope: ListEnvelope<Category> = read_json(response).await?;
        Ok(envelope.into_vec())
    }

    /// Get a single category by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(&format!("category/{id}")))
            .send()
            .await?;

        read_json(response).await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// List the caller's favorites.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a credential.
    #[instrument(skip(self))]
    pub async fn list_favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        let request = self.authed(self.inner.client.get(self.endpoint("favorites")))?;
        let response = request.send().await?;

        let envelope: ListEnvelope<Favorite> = read_json(response).await?;
        Ok(envelope.into_vec())
    }

    /// Mark a product as a favorite. The server derives the user from the
    /// bearer token; only the product id travels in the body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a credential.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_favorite(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let request = self.authed(
            self.inner
                .client
                .post(self.endpoint("favorites/add"))
                .json(&serde_json::json!({ "product": product_id })),
        )?;

        check_ok(request.send().await?).await
    }

    /// Remove a favorite by its id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a credential.
    #[instrument(skip(self), fields(favorite_id = %favorite_id))]
    pub async fn delete_favorite(&self, favorite_id: &FavoriteId) -> Result<(), ApiError> {
        let request = self.authed(
            self.inner
                .client
                .delete(self.endpoint(&format!("favorites/{favorite_id}"))),
        )?;

        check_ok(request.send().await?).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a new account. Stores the issued token when one is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if registration is rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/register"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthResponse = read_json(response).await?;
        if let Some(token) = auth.token.clone() {
            self.inner.credentials.store_token(token.into());
        }
        Ok(auth)
    }

    /// Log in with email and password. Stores the issued token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on rejected credentials, or
    /// [`ApiError::Unknown`] when the response carries no token.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let auth: AuthResponse = read_json(response).await?;
        let Some(token) = auth.token.clone() else {
            return Err(ApiError::Unknown(
                "login response carried no token".to_string(),
            ));
        };
        self.inner.credentials.store_token(token.into());
        Ok(auth)
    }

    /// Log out. The local token is cleared even when the remote call fails.
    ///
    /// # Errors
    ///
    /// Returns the remote error, after clearing the local token.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = match self.authed(self.inner.client.get(self.endpoint("auth/logout"))) {
            Ok(request) => match request.send().await {
                Ok(response) => check_ok(response).await,
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };

        self.inner.credentials.clear_token();
        result
    }

    /// Request a password-reset code to be emailed to an address. No
    /// credential is required.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn reset_password_request(&self, email: &str) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/reset-password"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;

        check_ok(response).await
    }

    /// Redeem a reset code and set a new password.
    ///
    /// # Errors
    ///
    /// Returns an error when the code is rejected.
    #[instrument(skip(self, new_password), fields(email = %email))]
    pub async fn reset_password_confirm(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/verify-reset-code"))
            .json(&serde_json::json!({
                "email": email,
                "code": code,
                "newPassword": new_password,
            }))
            .send()
            .await?;

        check_ok(response).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a credential.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let request = self.authed(self.inner.client.get(self.endpoint("users/token")))?;
        let response = request.send().await?;

        let envelope: UserEnvelope = read_json(response).await?;
        Ok(envelope.into_user())
    }

    /// Fetch a user's profile by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a credential, or
    /// [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_user_by_id(&self, id: &UserId) -> Result<User, ApiError> {
        let request = self.authed(
            self.inner
                .client
                .get(self.endpoint(&format!("users/{id}"))),
        )?;
        let response = request.send().await?;

        let envelope: UserEnvelope = read_json(response).await?;
        Ok(envelope.into_user())
    }

    /// Update the authenticated user's profile.
    ///
    /// The backend keys updates by user id rather than by token, so the
    /// current profile is fetched first to learn the id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a credential.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let current = self.current_user().await?;
        let request = self.authed(
            self.inner
                .client
                .put(self.endpoint(&format!("users/{}", current.id)))
                .json(update),
        )?;
        let response = request.send().await?;

        let envelope: UserEnvelope = read_json(response).await?;
        Ok(envelope.into_user())
    }

    /// Delete the authenticated user's account.
    ///
    /// The local token is not cleared here; callers follow up with
    /// [`logout`](Self::logout) or clear the credential themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a credential.
    #[instrument(skip(self))]
    pub async fn delete_user(&self) -> Result<(), ApiError> {
        let current = self.current_user().await?;
        let request = self.authed(
            self.inner
                .client
                .delete(self.endpoint(&format!("users/{}", current.id))),
        )?;

        check_ok(request.send().await?).await
    }

    // =========================================================================
    // Hero banners
    // =========================================================================

    /// Fetch the hero banners for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_hero_banners(&self) -> Result<Vec<HeroBanner>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.inner.config.hero_endpoint("get/"))
            .send()
            .await?;

        let envelope: ListEnvelope<HeroBanner> = read_json(response).await?;
        Ok(envelope.into_vec())
    }
}

// =============================================================================
// Collaborator traits
// =============================================================================

#[async_trait]
impl OrderStore for ApiClient {
    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<RemoteOrder>, ApiError> {
        let request = self.authed(self.inner.client.get(self.endpoint("order/userorder")))?;
        let response = request.send().await?;

        // The order list comes back as a bare array; anything else is
        // treated as "no orders" rather than an error.
        let value: serde_json::Value = read_json(response).await?;
        if value.is_array() {
            Ok(serde_json::from_value(value)?)
        } else {
            warn!("order list response is not an array, treating as empty");
            Ok(Vec::new())
        }
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn create_order(&self, product_id: &ProductId) -> Result<RemoteOrder, ApiError> {
        let request = self.authed(
            self.inner
                .client
                .post(self.endpoint("order/add"))
                .json(&serde_json::json!({ "product": product_id })),
        )?;

        let response = request.send().await?;
        read_json(response).await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn delete_order(&self, order_id: &OrderId) -> Result<(), ApiError> {
        let request = self.authed(
            self.inner
                .client
                .delete(self.endpoint(&format!("order/{order_id}"))),
        )?;

        check_ok(request.send().await?).await
    }
}

#[async_trait]
impl ProductCatalog for ApiClient {
    #[instrument(skip(self), fields(id = %id))]
    async fn product_by_id(&self, id: &ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.product_cache.get(id).await {
            debug!("cache hit for product");
            return Ok(product);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint(&format!("product/{id}")))
            .send()
            .await?;

        let payload: ProductPayload = read_json(response).await?;
        let product = payload.into_product();
        self.inner
            .product_cache
            .insert(id.clone(), product.clone())
            .await;
        Ok(product)
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Decode a JSON response body, classifying non-success statuses first.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::from_response(status, extract_message(&body)));
    }

    Ok(serde_json::from_str(&body)?)
}

/// Check a response for success, discarding the body.
async fn check_ok(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status, extract_message(&body)))
}

/// Pull the `message` field out of an error body, falling back to the raw
/// body truncated for log hygiene.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use crate::session::SessionTokens;

    use super::*;

    fn client_for(url: &str, session: Arc<SessionTokens>) -> ApiClient {
        let config = crate::config::ApiConfig::new(url).unwrap();
        ApiClient::new(&config, session).unwrap()
    }

    fn authed_session() -> Arc<SessionTokens> {
        Arc::new(SessionTokens::with_token(SecretString::from("test-token")))
    }

    #[tokio::test]
    async fn list_orders_without_credential_skips_network() {
        // Points at a closed port; an Unauthorized result proves no
        // request was attempted.
        let client = client_for("http://127.0.0.1:1", Arc::new(SessionTokens::new()));
        let err = client.list_orders().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn list_orders_parses_bare_array() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/vi/order/userorder")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"_id":"o1","product":"p1"},{"_id":"o2","product":{"_id":"p2"}}]"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), authed_session());
        let orders = client.list_orders().await.unwrap();

        mock.assert_async().await;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, OrderId::new("o1"));
        assert_eq!(
            orders[1].product.product_id(),
            Some(&ProductId::new("p2"))
        );
    }

    #[tokio::test]
    async fn non_array_order_list_degrades_to_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/vi/order/userorder")
            .with_status(200)
            .with_body(r#"{"message":"unexpected"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), authed_session());
        let orders = client.list_orders().await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_classifies_as_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/vi/order/add")
            .with_status(400)
            .with_body(r#"{"message":"Order already exists for this product"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), authed_session());
        let err = client
            .create_order(&ProductId::new("p1"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn missing_product_classifies_as_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/vi/product/p404")
            .with_status(404)
            .with_body(r#"{"message":"product not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), authed_session());
        let err = client
            .product_by_id(&ProductId::new("p404"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn product_lookup_hits_cache_on_second_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/vi/product/p1")
            .with_status(200)
            .with_body(r#"{"_id":"p1","name":"Dates","price":10}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url(), authed_session());
        let first = client.product_by_id(&ProductId::new("p1")).await.unwrap();
        let second = client.product_by_id(&ProductId::new("p1")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(first.name, "Dates");
    }

    #[tokio::test]
    async fn login_stores_the_issued_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/vi/auth/login")
            .with_status(200)
            .with_body(r#"{"token":"issued-token","user":{"_id":"u1"}}"#)
            .create_async()
            .await;

        let session = Arc::new(SessionTokens::new());
        let client = client_for(&server.url(), session.clone());
        client.login("a@example.com", "hunter2").await.unwrap();

        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn reset_password_request_needs_no_credential() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/vi/auth/reset-password")
            .with_status(200)
            .with_body(r#"{"message":"code sent"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(SessionTokens::new()));
        client
            .reset_password_request("a@example.com")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_reset_code_surfaces_the_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/vi/auth/verify-reset-code")
            .with_status(400)
            .with_body(r#"{"message":"invalid code"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), Arc::new(SessionTokens::new()));
        let err = client
            .reset_password_confirm("a@example.com", "000000", "hunter3")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unknown(m) if m == "invalid code"));
    }

    #[tokio::test]
    async fn update_user_resolves_the_id_then_puts_the_profile() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/vi/users/token")
            .with_status(200)
            .with_body(r#"{"user":{"_id":"u1","username":"amina"}}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/api/vi/users/u1")
            .with_status(200)
            .with_body(r#"{"_id":"u1","username":"amina-renamed"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), authed_session());
        let update = UserUpdate {
            username: Some("amina-renamed".to_string()),
            ..UserUpdate::default()
        };
        let user = client.update_user(&update).await.unwrap();

        put.assert_async().await;
        assert_eq!(user.username.as_deref(), Some("amina-renamed"));
    }

    #[tokio::test]
    async fn delete_user_targets_the_current_account() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/vi/users/token")
            .with_status(200)
            .with_body(r#"{"user":{"_id":"u1"}}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/api/vi/users/u1")
            .with_status(200)
            .with_body(r#"{"message":"deleted"}"#)
            .create_async()
            .await;

        let session = authed_session();
        let client = client_for(&server.url(), session.clone());
        client.delete_user().await.unwrap();

        delete.assert_async().await;
        // Deleting the account does not clear the credential by itself.
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_token_even_on_remote_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/vi/auth/logout")
            .with_status(500)
            .with_body(r#"{"message":"boom"}"#)
            .create_async()
            .await;

        let session = authed_session();
        let client = client_for(&server.url(), session.clone());
        let result = client.logout().await;

        assert!(result.is_err());
        assert!(!session.is_authenticated());
    }
}
