use super::order::{GatewayOrder, OrderRequest, VerifiedPayment};
use super::user::{NewUser, User};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A mutation applied to a user record inside the store's critical section.
pub type UserMutation = Box<dyn FnOnce(&mut User) -> Result<()> + Send>;

/// Storage for user records, keyed by phone number.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>>;
    /// Assigns the next sequential id and stores the record. Fails with a
    /// conflict if the phone number is already registered.
    async fn insert(&self, user: NewUser) -> Result<User>;
    /// Overwrites an existing record, matched by phone number.
    async fn update(&self, user: User) -> Result<()>;
    /// Applies `mutate` to the record under the store's write lock and
    /// returns the updated record. Read, mutation, and persist happen in one
    /// critical section; a failing closure leaves the record untouched.
    async fn update_with(&self, phone_number: &str, mutate: UserMutation) -> Result<User>;
    async fn all(&self) -> Result<Vec<User>>;
}

/// Ledger of payment orders that have already been applied, so a replayed
/// verification is a no-op returning the prior outcome.
#[async_trait]
pub trait AppliedOrderStore: Send + Sync {
    async fn get(&self, order_id: &str) -> Result<Option<VerifiedPayment>>;
    async fn record(&self, order_id: &str, outcome: VerifiedPayment) -> Result<()>;
}

/// The external payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder>;
    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder>;
}

pub type UserStoreRef = Arc<dyn UserStore>;
pub type AppliedOrderStoreRef = Arc<dyn AppliedOrderStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
