use crate::domain::user::Balance;
use crate::error::ShopError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a payment order is for, carried in the order notes so the verify step
/// can recover the intent without trusting the client.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseIntent {
    #[default]
    Recharge,
    Product,
}

/// Metadata embedded in a gateway order at creation time.
///
/// The gateway knows nothing about this system's user model; the notes map is
/// the only channel that survives the external round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderNotes {
    pub phone_number: String,
    pub purchase_type: PurchaseIntent,
    pub qr_id: Option<String>,
}

const NOTE_PHONE: &str = "phoneNumber";
const NOTE_PURCHASE_TYPE: &str = "purchaseType";
const NOTE_QR_ID: &str = "qrId";

impl OrderNotes {
    pub fn recharge(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            purchase_type: PurchaseIntent::Recharge,
            qr_id: None,
        }
    }

    pub fn product(phone_number: impl Into<String>, qr_id: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            purchase_type: PurchaseIntent::Product,
            qr_id: Some(qr_id.into()),
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut notes = BTreeMap::new();
        notes.insert(NOTE_PHONE.to_string(), self.phone_number.clone());
        notes.insert(
            NOTE_PURCHASE_TYPE.to_string(),
            match self.purchase_type {
                PurchaseIntent::Recharge => "recharge".to_string(),
                PurchaseIntent::Product => "product".to_string(),
            },
        );
        if let Some(qr_id) = &self.qr_id {
            notes.insert(NOTE_QR_ID.to_string(), qr_id.clone());
        }
        notes
    }

    /// Recovers the notes from a gateway order. A missing phone number means
    /// the payment cannot be attributed to anyone; anything other than an
    /// explicit `product` marker is treated as a plain top-up.
    pub fn from_map(notes: &BTreeMap<String, String>) -> Result<Self, ShopError> {
        let phone_number = notes
            .get(NOTE_PHONE)
            .filter(|phone| !phone.is_empty())
            .cloned()
            .ok_or_else(|| {
                ShopError::Internal("gateway order notes carry no phone number".to_string())
            })?;
        let purchase_type = match notes.get(NOTE_PURCHASE_TYPE).map(String::as_str) {
            Some("product") => PurchaseIntent::Product,
            _ => PurchaseIntent::Recharge,
        };
        Ok(Self {
            phone_number,
            purchase_type,
            qr_id: notes.get(NOTE_QR_ID).cloned(),
        })
    }
}

/// Parameters for creating a remote order, already converted to the
/// gateway's minor currency unit.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: BTreeMap<String, String>,
}

/// A gateway-side order record. Unknown fields from the remote API are
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor units (e.g. paise).
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

/// Outcome of a successfully verified payment, recorded per order id so a
/// replayed verification returns the same result without mutating anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    pub status: String,
    #[serde(rename = "newBalance", skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<Balance>,
}

impl VerifiedPayment {
    pub fn recharge(new_balance: Balance) -> Self {
        Self {
            status: "success".to_string(),
            new_balance: Some(new_balance),
        }
    }

    pub fn product() -> Self {
        Self {
            status: "success".to_string(),
            new_balance: None,
        }
    }
}
