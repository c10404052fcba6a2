//! Newtype IDs for type-safe entity references.
//!
//! The remote API hands out opaque string identifiers (Mongo-style hex
//! strings). Use the `define_id!` macro to create type-safe wrappers that
//! prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use souq_core::define_id;
/// define_id!(ItemId);
/// define_id!(BatchId);
///
/// let item = ItemId::new("64f1a2b3c4d5e6f708192a3b");
/// let batch = BatchId::new("64f1a2b3c4d5e6f708192a3b");
///
/// // These are different types, so this won't compile:
/// // let _: ItemId = batch;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(OrderId);
define_id!(FavoriteId);
define_id!(BannerId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let order = OrderId::new("o1");
        let product = ProductId::new("o1");
        assert_eq!(order.as_str(), product.as_str());
    }

    #[test]
    fn id_serializes_transparently() {
        let id = ProductId::new("64f1a2b3");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"64f1a2b3\"");

        let back: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_display_matches_inner() {
        let id = OrderId::new("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(String::from(id), "abc123");
    }
}
