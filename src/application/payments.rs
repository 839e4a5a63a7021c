use crate::domain::order::{
    GatewayOrder, OrderNotes, OrderRequest, PurchaseIntent, VerifiedPayment,
};
use crate::domain::ports::{
    AppliedOrderStoreRef, PaymentGatewayRef, UserMutation, UserStoreRef,
};
use crate::domain::user::{Amount, Balance, Product, User};
use crate::error::{Result, ShopError};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_CURRENCY: &str = "INR";

/// Orchestrates the payment-order flow: creating gateway orders and applying
/// verified payment callbacks exactly once.
#[derive(Clone)]
pub struct PaymentService {
    users: UserStoreRef,
    applied_orders: AppliedOrderStoreRef,
    gateway: PaymentGatewayRef,
    webhook_secret: String,
    /// Serializes the applied-order check with the mutation it guards, so
    /// one order id is applied exactly once under concurrent callbacks.
    apply_lock: Arc<Mutex<()>>,
}

impl PaymentService {
    pub fn new(
        users: UserStoreRef,
        applied_orders: AppliedOrderStoreRef,
        gateway: PaymentGatewayRef,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            users,
            applied_orders,
            gateway,
            webhook_secret: webhook_secret.into(),
            apply_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a remote order for `amount` major units. The initiating phone
    /// number and purchase intent travel in the order notes; they are the
    /// only way the verify step can recover whose order this is.
    ///
    /// Client-supplied notes are carried along as extra metadata, but the
    /// server-set keys always win.
    pub async fn create_order(
        &self,
        amount: Decimal,
        currency: Option<String>,
        phone_number: &str,
        qr_id: Option<String>,
        client_notes: BTreeMap<String, String>,
    ) -> Result<GatewayOrder> {
        if phone_number.is_empty() {
            return Err(ShopError::Validation(
                "Phone number is required".to_string(),
            ));
        }
        let amount = Amount::new(amount)?;
        let notes = match qr_id {
            Some(qr_id) => OrderNotes::product(phone_number, qr_id),
            None => OrderNotes::recharge(phone_number),
        };
        let mut notes_map = client_notes;
        notes_map.extend(notes.to_map());

        let request = OrderRequest {
            amount: amount.minor_units()?,
            currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            receipt: format!("receipt_{phone_number}"),
            notes: notes_map,
        };

        let order = self.gateway.create_order(request).await?;
        tracing::info!(order_id = %order.id, amount = order.amount, "gateway order created");
        Ok(order)
    }

    /// Hex HMAC-SHA256 over `order_id|payment_id`, keyed by the gateway
    /// secret. Only the gateway can produce a matching signature.
    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|err| ShopError::Internal(format!("HMAC key setup failed: {err}")))?;
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Validates a payment confirmation and applies the mutation it stands
    /// for, exactly once.
    ///
    /// The signature authenticates the callback; the order is then re-fetched
    /// from the gateway so the applied amount and intent come from the
    /// gateway's records, never from the client. Replays of an already
    /// applied order return the recorded outcome without touching any state.
    pub async fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
        product_data: Option<Product>,
    ) -> Result<VerifiedPayment> {
        if self.expected_signature(order_id, payment_id)? != signature {
            tracing::warn!(order_id, "payment signature mismatch");
            return Err(ShopError::InvalidSignature);
        }

        if let Some(prior) = self.applied_orders.get(order_id).await? {
            tracing::info!(order_id, "order already applied, replay is a no-op");
            return Ok(prior);
        }

        let order = self.gateway.fetch_order(order_id).await?;
        let notes = OrderNotes::from_map(&order.notes)?;

        // The gateway round trip stays outside the lock; the ledger is
        // re-checked once it is held, so concurrent callbacks for the same
        // order apply it exactly once.
        let _guard = self.apply_lock.lock().await;
        if let Some(prior) = self.applied_orders.get(order_id).await? {
            tracing::info!(order_id, "order already applied, replay is a no-op");
            return Ok(prior);
        }

        let outcome = match notes.purchase_type {
            PurchaseIntent::Product => {
                let product = product_data.ok_or_else(|| {
                    ShopError::Validation("productData is required for product orders".to_string())
                })?;
                // The client echoes the product payload; the paid amount is
                // authoritative and the two must agree.
                if Amount::new(product.price)?.minor_units()? != order.amount {
                    return Err(ShopError::Validation(
                        "Product price does not match the paid order".to_string(),
                    ));
                }
                self.apply(
                    &notes.phone_number,
                    order_id,
                    Box::new(move |user| {
                        user.purchases.push(product);
                        Ok(())
                    }),
                )
                .await?;
                VerifiedPayment::product()
            }
            PurchaseIntent::Recharge => {
                let amount = order.amount;
                let user = self
                    .apply(
                        &notes.phone_number,
                        order_id,
                        Box::new(move |user| {
                            user.balance += Balance::from_minor_units(amount);
                            Ok(())
                        }),
                    )
                    .await?;
                VerifiedPayment::recharge(user.balance)
            }
        };

        self.applied_orders
            .record(order_id, outcome.clone())
            .await?;
        tracing::info!(order_id, payment_id, "payment verified and applied");
        Ok(outcome)
    }

    /// Runs `mutate` in the user store's critical section, flagging the
    /// anomaly where the gateway accepted money for a phone number no user
    /// record matches.
    async fn apply(
        &self,
        phone_number: &str,
        order_id: &str,
        mutate: UserMutation,
    ) -> Result<User> {
        match self.users.update_with(phone_number, mutate).await {
            Err(err @ ShopError::NotFound(_)) => {
                tracing::error!(
                    order_id,
                    phone_number,
                    "verified payment cannot be attributed to any user"
                );
                Err(err)
            }
            other => other,
        }
    }
}
