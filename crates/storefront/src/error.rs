//! Error taxonomy for the storefront client.
//!
//! [`ApiError`] classifies every remote failure at the HTTP boundary so the
//! layers above can branch on kind rather than on status codes or message
//! strings. [`CartError`] is the thin cart-layer wrapper on top of it.

use reqwest::StatusCode;
use souq_core::OrderId;
use thiserror::Error;

/// Message substring the order endpoint returns for a duplicate order.
///
/// The remote signals "order for this product already exists" with a plain
/// 400 and a message body, not a 409, so classification has to look at the
/// message content as well as the status.
const DUPLICATE_ORDER_MARKER: &str = "Order already exists";

/// Errors returned by the remote storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or rejected bearer credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An equivalent resource already exists remotely.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown product, order, or other resource id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No response reached the remote at all.
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Anything else; the remote message is passed through when available.
    #[error("API error: {0}")]
    Unknown(String),
}

impl ApiError {
    /// Classify a non-success HTTP response into the taxonomy.
    #[must_use]
    pub fn from_response(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            _ if message.contains(DUPLICATE_ORDER_MARKER) => Self::Conflict(message),
            _ => Self::Unknown(message),
        }
    }

    /// Whether this error means "the resource already exists remotely".
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether this error means "the resource does not exist remotely".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::NetworkUnavailable(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

/// Errors surfaced by the cart synchronizer itself.
#[derive(Debug, Error)]
pub enum CartError {
    /// The given order id has no matching local cart entry.
    #[error("no cart entry for order {0}")]
    UnknownOrder(OrderId),

    /// The outer remote fetch failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_taxonomy() {
        assert!(matches!(
            ApiError::from_response(StatusCode::UNAUTHORIZED, "no token".into()),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::FORBIDDEN, "bad token".into()),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::NOT_FOUND, "no such product".into()),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::CONFLICT, "duplicate".into()),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn duplicate_order_message_is_a_conflict() {
        // The remote reports duplicates with a 400 and a message, not a 409.
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            "Order already exists for this product".into(),
        );
        assert!(err.is_conflict());
    }

    #[test]
    fn other_client_errors_pass_message_through() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, "missing field".into());
        assert!(matches!(err, ApiError::Unknown(ref m) if m == "missing field"));
    }

    #[test]
    fn cart_error_display() {
        let err = CartError::UnknownOrder(OrderId::new("o9"));
        assert_eq!(err.to_string(), "no cart entry for order o9");
    }
}
