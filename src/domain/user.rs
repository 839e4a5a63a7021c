use crate::error::ShopError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// A user's spendable credit, in major currency units.
///
/// Wrapper around `rust_decimal::Decimal` to enforce domain rules (a purchase
/// can never drive it negative) and keep currency arithmetic exact.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A positive monetary amount, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ShopError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(ShopError::Validation(
                "Amount must be a positive number".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to the gateway's minor unit (amount × 100, rounded to the
    /// nearest integer) without going through floating point.
    pub fn minor_units(&self) -> Result<i64, ShopError> {
        use rust_decimal::prelude::ToPrimitive;
        use rust_decimal::RoundingStrategy;

        (self.0 * Decimal::from(100))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| ShopError::Validation("Amount out of range".to_string()))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ShopError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Converts a gateway minor-unit amount back to major units.
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    pub fn credit(&mut self, amount: Decimal) {
        self.0 += amount;
    }

    /// Deducts `price` if covered, otherwise fails and leaves the balance
    /// untouched.
    pub fn debit(&mut self, price: Decimal) -> Result<(), ShopError> {
        if self.0 >= price {
            self.0 -= price;
            Ok(())
        } else {
            Err(ShopError::InsufficientFunds)
        }
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// A purchased product entry. Opaque beyond name and price; any extra fields
/// the client supplied are preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Decimal,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A registered user. The phone number is the unique key; records are never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub phone_number: String,
    pub password_hash: String,
    pub invitation_code: String,
    pub balance: Balance,
    pub purchases: Vec<Product>,
}

/// Registration data before the store assigns an identifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone_number: String,
    pub password_hash: String,
    pub invitation_code: String,
}

impl NewUser {
    pub fn into_user(self, id: u64) -> User {
        User {
            id,
            phone_number: self.phone_number,
            password_hash: self.password_hash,
            invitation_code: self.invitation_code,
            balance: Balance::ZERO,
            purchases: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(ShopError::Validation(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(ShopError::Validation(_))
        ));
    }

    #[test]
    fn test_minor_unit_conversion() {
        assert_eq!(Amount::new(dec!(10)).unwrap().minor_units().unwrap(), 1000);
        assert_eq!(Amount::new(dec!(10.5)).unwrap().minor_units().unwrap(), 1050);
        // Rounded to the nearest integer, never truncated.
        assert_eq!(
            Amount::new(dec!(10.005)).unwrap().minor_units().unwrap(),
            1001
        );
        assert_eq!(
            Amount::new(dec!(10.004)).unwrap().minor_units().unwrap(),
            1000
        );
    }

    #[test]
    fn test_major_unit_conversion() {
        assert_eq!(Balance::from_minor_units(1050), Balance::new(dec!(10.50)));
        assert_eq!(Balance::from_minor_units(1), Balance::new(dec!(0.01)));
    }

    #[test]
    fn test_balance_credit_and_debit() {
        let mut balance = Balance::new(dec!(10.0));
        balance.credit(dec!(5.0));
        assert_eq!(balance, Balance::new(dec!(15.0)));

        balance.debit(dec!(15.0)).unwrap();
        assert_eq!(balance, Balance::new(dec!(0.0)));
    }

    #[test]
    fn test_debit_insufficient_leaves_balance_untouched() {
        let mut balance = Balance::new(dec!(10.0));
        let result = balance.debit(dec!(20.0));
        assert!(matches!(result, Err(ShopError::InsufficientFunds)));
        assert_eq!(balance, Balance::new(dec!(10.0)));
    }

    #[test]
    fn test_product_preserves_extra_fields() {
        let json = r#"{"name":"Antminer S19","price":150.5,"hashrate":"95TH"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.name, "Antminer S19");
        assert_eq!(product.price, dec!(150.5));
        assert_eq!(
            product.extra.get("hashrate").and_then(|v| v.as_str()),
            Some("95TH")
        );

        let round_tripped = serde_json::to_value(&product).unwrap();
        assert_eq!(round_tripped["hashrate"], "95TH");
    }

    #[test]
    fn test_user_serialization_uses_camel_case() {
        let user = NewUser {
            phone_number: "9876543210".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            invitation_code: "INV01".to_string(),
        }
        .into_user(1);

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["phoneNumber"], "9876543210");
        assert_eq!(value["invitationCode"], "INV01");
        assert!(value.get("password").is_none());
    }
}
