use async_trait::async_trait;
use hashrate_shop::application::accounts::AccountService;
use hashrate_shop::application::payments::PaymentService;
use hashrate_shop::domain::order::{GatewayOrder, OrderRequest};
use hashrate_shop::domain::ports::{PaymentGateway, UserStoreRef};
use hashrate_shop::error::{Result, ShopError};
use hashrate_shop::infrastructure::in_memory::{InMemoryAppliedOrders, InMemoryUserStore};
use hashrate_shop::interfaces::http::AppState;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const TEST_KEY_ID: &str = "rzp_test_key";
pub const TEST_SECRET: &str = "test_secret";

/// Reference signature computation, independent of the server's.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// In-process stand-in for the remote gateway, injected through the
/// `PaymentGateway` port.
#[derive(Default)]
pub struct FakeGateway {
    orders: RwLock<HashMap<String, GatewayOrder>>,
    counter: AtomicU64,
    pub reject_orders: AtomicBool,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn order(&self, order_id: &str) -> Option<GatewayOrder> {
        self.orders.read().await.get(order_id).cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        if self.reject_orders.load(Ordering::SeqCst) {
            return Err(ShopError::gateway(
                Some(400),
                "Order amount less than minimum amount allowed",
            ));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let order = GatewayOrder {
            id: format!("order_FAKE{n}"),
            amount: request.amount,
            currency: request.currency,
            status: "created".to_string(),
            notes: request.notes,
        };
        self.orders
            .write()
            .await
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder> {
        self.orders
            .read()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| ShopError::gateway(Some(400), "order does not exist"))
    }
}

/// Application state wired to in-memory stores and the fake gateway.
pub fn test_state() -> (AppState, Arc<FakeGateway>) {
    let users: UserStoreRef = Arc::new(InMemoryUserStore::new());
    let gateway = FakeGateway::new();
    let state = AppState {
        accounts: AccountService::new(users.clone()),
        payments: PaymentService::new(
            users.clone(),
            Arc::new(InMemoryAppliedOrders::new()),
            gateway.clone(),
            TEST_SECRET,
        ),
        users,
        gateway_key_id: TEST_KEY_ID.to_string(),
    };
    (state, gateway)
}
