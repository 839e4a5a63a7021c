use crate::domain::order::VerifiedPayment;
use crate::domain::ports::{AppliedOrderStore, UserMutation, UserStore};
use crate::domain::user::{NewUser, User};
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for user records, keyed by phone number.
///
/// Used in tests and as the reference implementation of the `UserStore`
/// port; nothing is persisted.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(phone_number).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.phone_number) {
            return Err(ShopError::Conflict(
                "Phone number already registered".to_string(),
            ));
        }
        // Ids are sequential and records are never deleted.
        let id = users.values().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = user.into_user(id);
        users.insert(user.phone_number.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.phone_number) {
            return Err(ShopError::NotFound("User not found".to_string()));
        }
        users.insert(user.phone_number.clone(), user);
        Ok(())
    }

    async fn update_with(&self, phone_number: &str, mutate: UserMutation) -> Result<User> {
        let mut users = self.users.write().await;
        let slot = users
            .get_mut(phone_number)
            .ok_or_else(|| ShopError::NotFound("User not found".to_string()))?;
        // Mutate a draft so a failing closure cannot leave a half-applied
        // record behind.
        let mut draft = slot.clone();
        mutate(&mut draft)?;
        *slot = draft.clone();
        Ok(draft)
    }

    async fn all(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_key(|user| user.id);
        Ok(all)
    }
}

/// In-memory ledger of applied payment orders.
#[derive(Default, Clone)]
pub struct InMemoryAppliedOrders {
    orders: Arc<RwLock<HashMap<String, VerifiedPayment>>>,
}

impl InMemoryAppliedOrders {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppliedOrderStore for InMemoryAppliedOrders {
    async fn get(&self, order_id: &str) -> Result<Option<VerifiedPayment>> {
        let orders = self.orders.read().await;
        Ok(orders.get(order_id).cloned())
    }

    async fn record(&self, order_id: &str, outcome: VerifiedPayment) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order_id.to_string(), outcome);
        Ok(())
    }
}
