//! Souq storefront client library.
//!
//! Owns the client side of the storefront: a typed REST client for the
//! remote API and the cart synchronizer that keeps a local view of the
//! caller's cart consistent with the remote order list.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod mirror;
pub mod session;

pub use api::{ApiClient, OrderStore, ProductCatalog};
pub use cart::{AddOutcome, CartEntry, CartSynchronizer};
pub use config::ApiConfig;
pub use error::{ApiError, CartError};
pub use mirror::{CartMirror, JsonFileMirror, MemoryMirror};
pub use session::{CredentialProvider, SessionTokens};
