use crate::domain::order::VerifiedPayment;
use crate::domain::ports::{AppliedOrderStore, UserMutation, UserStore};
use crate::domain::user::{NewUser, User};
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// On-disk layout: the whole collection in one JSON document, rewritten on
/// every mutation.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    users: Vec<User>,
    #[serde(default)]
    applied_orders: BTreeMap<String, VerifiedPayment>,
}

/// A persistent store backed by a single JSON file.
///
/// Holds users and the applied-order ledger in one document. The write lock
/// is held across the in-memory mutation and the file rewrite, so mutating
/// operations are serialized; the rewrite goes through a temp file and a
/// rename, so a crash mid-write never leaves a torn store behind.
///
/// `Clone` shares the underlying state; the same instance is boxed once as a
/// `UserStore` and once as an `AppliedOrderStore`.
#[derive(Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
    state: Arc<RwLock<StoreFile>>,
}

impl JsonFileStore {
    /// Opens the store, loading any existing file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            StoreFile::default()
        };
        Ok(Self {
            path: Arc::new(path),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Rewrites the backing file atomically (write temp, then rename).
    ///
    /// The blocking filesystem work runs off the async workers; the caller's
    /// write lock stays held across it, so writers remain serialized.
    async fn persist(&self, state: &StoreFile) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || {
            let tmp_path = path.with_extension("json.tmp");
            std::fs::write(&tmp_path, &bytes)?;
            std::fs::rename(&tmp_path, path.as_ref())
        })
        .await
        .map_err(|err| ShopError::Internal(format!("store write task failed: {err}")))??;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|user| user.phone_number == phone_number)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|existing| existing.phone_number == user.phone_number)
        {
            return Err(ShopError::Conflict(
                "Phone number already registered".to_string(),
            ));
        }
        let id = state.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = user.into_user(id);
        state.users.push(user.clone());
        self.persist(&state).await?;
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<()> {
        let mut state = self.state.write().await;
        let slot = state
            .users
            .iter_mut()
            .find(|existing| existing.phone_number == user.phone_number)
            .ok_or_else(|| ShopError::NotFound("User not found".to_string()))?;
        *slot = user;
        self.persist(&state).await?;
        Ok(())
    }

    async fn update_with(&self, phone_number: &str, mutate: UserMutation) -> Result<User> {
        let mut state = self.state.write().await;
        let slot = state
            .users
            .iter_mut()
            .find(|existing| existing.phone_number == phone_number)
            .ok_or_else(|| ShopError::NotFound("User not found".to_string()))?;
        // Mutate a draft so a failing closure leaves both the in-memory
        // state and the file untouched.
        let mut draft = slot.clone();
        mutate(&mut draft)?;
        *slot = draft.clone();
        self.persist(&state).await?;
        Ok(draft)
    }

    async fn all(&self) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(state.users.clone())
    }
}

#[async_trait]
impl AppliedOrderStore for JsonFileStore {
    async fn get(&self, order_id: &str) -> Result<Option<VerifiedPayment>> {
        let state = self.state.read().await;
        Ok(state.applied_orders.get(order_id).cloned())
    }

    async fn record(&self, order_id: &str, outcome: VerifiedPayment) -> Result<()> {
        let mut state = self.state.write().await;
        state.applied_orders.insert(order_id.to_string(), outcome);
        self.persist(&state).await?;
        Ok(())
    }
}
