use crate::domain::user::Product;
use crate::error::ShopError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub invitation_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashrateQuery {
    pub phone_number: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyProductRequest {
    pub phone_number: String,
    pub product_data: Product,
}

/// Order creation body. `amount` arrives as a JSON number or a numeric
/// string depending on the client, so it is parsed explicitly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub amount: Option<serde_json::Value>,
    pub currency: Option<String>,
    pub phone_number: String,
    pub qr_id: Option<String>,
    /// Extra metadata forwarded into the gateway order notes.
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl CreateOrderRequest {
    pub fn parsed_amount(&self) -> Result<Decimal, ShopError> {
        let invalid = || ShopError::Validation("Amount must be a positive number".to_string());
        let value = self.amount.as_ref().ok_or_else(invalid)?;
        match value {
            serde_json::Value::Number(number) => {
                Decimal::from_str(&number.to_string()).map_err(|_| invalid())
            }
            serde_json::Value::String(text) => {
                Decimal::from_str(text.trim()).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }
}

/// Callback body posted after checkout. Field names follow the gateway's
/// checkout contract and must not be renamed.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "productData")]
    pub product_data: Option<Product>,
}
