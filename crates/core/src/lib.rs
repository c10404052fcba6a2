//! Souq Core - Shared types library.
//!
//! Types shared across the Souq storefront client crates. This crate
//! contains only types - no I/O, no HTTP clients - which keeps it
//! lightweight and lets it be depended on from anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the normalized
//!   product snapshot

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
