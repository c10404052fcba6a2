//! Core types for the Souq storefront client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod product;

pub use id::*;
pub use product::{Product, UNRESOLVED_PRODUCT_NAME};
