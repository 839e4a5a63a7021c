use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShopError>;

/// Failure taxonomy for the storefront.
///
/// Variants map one-to-one onto HTTP status codes at the interface boundary;
/// the application and domain layers only ever deal in `ShopError`.
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("{0}")]
    Unauthorized(String),
    #[error("Insufficient balance")]
    InsufficientFunds,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Payment gateway error: {message}")]
    Gateway { status: Option<u16>, message: String },
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<bcrypt::BcryptError> for ShopError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(format!("password hashing failed: {err}"))
    }
}

impl ShopError {
    pub fn gateway(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            message: message.into(),
        }
    }

    /// Message safe to echo to clients. Internal detail stays in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Serialization(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ShopError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Gateway { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Storage(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "message": self.client_message(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ShopError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShopError::InvalidSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShopError::Unauthorized("nope".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ShopError::InsufficientFunds.status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ShopError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ShopError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_gateway_status_passthrough() {
        let err = ShopError::gateway(Some(422), "amount too small");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        // Unknown or missing remote status falls back to 500.
        let err = ShopError::gateway(None, "connection reset");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = ShopError::gateway(Some(99), "weird");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = ShopError::Internal("secret backend detail".into());
        assert_eq!(err.client_message(), "Internal server error");

        let err = ShopError::Conflict("Phone number already registered".into());
        assert_eq!(err.client_message(), "Phone number already registered");
    }
}
