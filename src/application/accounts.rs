use crate::domain::ports::UserStoreRef;
use crate::domain::user::{Balance, NewUser, Product, User};
use crate::error::{Result, ShopError};
use rust_decimal::Decimal;

pub const MIN_PASSWORD_LEN: usize = 8;

/// User-facing account operations over the injected store.
#[derive(Clone)]
pub struct AccountService {
    users: UserStoreRef,
}

impl AccountService {
    pub fn new(users: UserStoreRef) -> Self {
        Self { users }
    }

    /// Registers a new user. The password is hashed at rest; the cleartext
    /// never reaches the store.
    pub async fn register(
        &self,
        phone_number: &str,
        password: &str,
        invitation_code: &str,
    ) -> Result<User> {
        validate_password(password)?;
        if phone_number.is_empty() {
            return Err(ShopError::Validation(
                "Phone number is required".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let user = self
            .users
            .insert(NewUser {
                phone_number: phone_number.to_string(),
                password_hash,
                invitation_code: invitation_code.to_string(),
            })
            .await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Succeeds iff the phone number exists and the password verifies against
    /// the stored hash. An unknown phone number is indistinguishable from a
    /// wrong password.
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<User> {
        let user = self
            .users
            .find_by_phone(phone_number)
            .await?
            .ok_or_else(unauthorized)?;
        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(unauthorized());
        }
        Ok(user)
    }

    /// Re-validates the current password, then replaces it. The check and
    /// the swap happen in one store critical section.
    pub async fn change_password(
        &self,
        phone_number: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        validate_password(new_password)?;

        // Hashing is slow; do it before entering the store's write lock.
        let new_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;
        let current_password = current_password.to_string();
        self.users
            .update_with(
                phone_number,
                Box::new(move |user| {
                    if !bcrypt::verify(&current_password, &user.password_hash)? {
                        return Err(ShopError::Unauthorized(
                            "Current password is incorrect".to_string(),
                        ));
                    }
                    user.password_hash = new_hash;
                    Ok(())
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn purchases(&self, phone_number: &str) -> Result<Vec<Product>> {
        let user = self
            .users
            .find_by_phone(phone_number)
            .await?
            .ok_or_else(|| ShopError::NotFound("User not found".to_string()))?;
        Ok(user.purchases)
    }

    /// Balance-funded purchase: deducts the price and appends the product.
    /// Debit and append run in one store critical section, so concurrent
    /// purchases see each other's deductions and the balance never goes
    /// negative.
    pub async fn buy_product(&self, phone_number: &str, product: Product) -> Result<Balance> {
        if product.price <= Decimal::ZERO {
            return Err(ShopError::Validation(
                "Product price must be a positive number".to_string(),
            ));
        }

        let price = product.price;
        let user = self
            .users
            .update_with(
                phone_number,
                Box::new(move |user| {
                    user.balance.debit(price)?;
                    user.purchases.push(product);
                    Ok(())
                }),
            )
            .await?;

        tracing::info!(phone_number, balance = %user.balance.0, "product purchased from balance");
        Ok(user.balance)
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ShopError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn unauthorized() -> ShopError {
    ShopError::Unauthorized("Invalid phone number or password".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::UserStore;
    use crate::infrastructure::in_memory::InMemoryUserStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn service() -> AccountService {
        AccountService::new(Arc::new(InMemoryUserStore::new()))
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let service = service();
        let user = service
            .register("9876543210", "hunter2hunter2", "INV01")
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert_ne!(user.password_hash, "hunter2hunter2");
        assert!(bcrypt::verify("hunter2hunter2", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_phone_conflicts() {
        let service = service();
        service
            .register("9876543210", "hunter2hunter2", "")
            .await
            .unwrap();

        let result = service.register("9876543210", "anotherpass", "").await;
        assert!(matches!(result, Err(ShopError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let service = service();
        let result = service.register("9876543210", "short", "").await;
        assert!(matches!(result, Err(ShopError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login() {
        let service = service();
        service
            .register("9876543210", "hunter2hunter2", "")
            .await
            .unwrap();

        let user = service.login("9876543210", "hunter2hunter2").await.unwrap();
        assert_eq!(user.phone_number, "9876543210");

        let wrong = service.login("9876543210", "wrongpassword").await;
        assert!(matches!(wrong, Err(ShopError::Unauthorized(_))));

        let unknown = service.login("0000000000", "hunter2hunter2").await;
        assert!(matches!(unknown, Err(ShopError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_change_password() {
        let service = service();
        service
            .register("9876543210", "hunter2hunter2", "")
            .await
            .unwrap();

        let wrong = service
            .change_password("9876543210", "wrongpassword", "newpassword1")
            .await;
        assert!(matches!(wrong, Err(ShopError::Unauthorized(_))));

        let short = service
            .change_password("9876543210", "hunter2hunter2", "short")
            .await;
        assert!(matches!(short, Err(ShopError::Validation(_))));

        service
            .change_password("9876543210", "hunter2hunter2", "newpassword1")
            .await
            .unwrap();
        assert!(service.login("9876543210", "newpassword1").await.is_ok());
        assert!(service.login("9876543210", "hunter2hunter2").await.is_err());
    }

    #[tokio::test]
    async fn test_buy_product_insufficient_balance() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AccountService::new(store.clone());
        service
            .register("9876543210", "hunter2hunter2", "")
            .await
            .unwrap();

        let product = Product {
            name: "Antminer S19".to_string(),
            price: dec!(150.0),
            extra: Default::default(),
        };
        let result = service.buy_product("9876543210", product).await;
        assert!(matches!(result, Err(ShopError::InsufficientFunds)));

        let user = store.find_by_phone("9876543210").await.unwrap().unwrap();
        assert_eq!(user.balance, Balance::ZERO);
        assert!(user.purchases.is_empty());
    }

    #[tokio::test]
    async fn test_buy_product_deducts_and_appends() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AccountService::new(store.clone());
        service
            .register("9876543210", "hunter2hunter2", "")
            .await
            .unwrap();

        let mut user = store.find_by_phone("9876543210").await.unwrap().unwrap();
        user.balance = Balance::new(dec!(200.0));
        store.update(user).await.unwrap();

        let product = Product {
            name: "Antminer S19".to_string(),
            price: dec!(150.0),
            extra: Default::default(),
        };
        let new_balance = service.buy_product("9876543210", product).await.unwrap();
        assert_eq!(new_balance, Balance::new(dec!(50.0)));

        let user = store.find_by_phone("9876543210").await.unwrap().unwrap();
        assert_eq!(user.purchases.len(), 1);
        assert_eq!(user.purchases[0].name, "Antminer S19");
    }

    #[tokio::test]
    async fn test_concurrent_purchases_never_overdraw() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AccountService::new(store.clone());
        service
            .register("9876543210", "hunter2hunter2", "")
            .await
            .unwrap();

        let mut user = store.find_by_phone("9876543210").await.unwrap().unwrap();
        user.balance = Balance::new(dec!(200.0));
        store.update(user).await.unwrap();

        let miner = |name: &str| Product {
            name: name.to_string(),
            price: dec!(150.0),
            extra: Default::default(),
        };
        // The balance covers one purchase, not two.
        let (first, second) = tokio::join!(
            service.buy_product("9876543210", miner("Antminer S19")),
            service.buy_product("9876543210", miner("Whatsminer M30")),
        );
        assert!(first.is_ok() != second.is_ok());

        let user = store.find_by_phone("9876543210").await.unwrap().unwrap();
        assert_eq!(user.balance, Balance::new(dec!(50.0)));
        assert_eq!(user.purchases.len(), 1);
    }

    #[tokio::test]
    async fn test_buy_product_rejects_non_positive_price() {
        let service = service();
        service
            .register("9876543210", "hunter2hunter2", "")
            .await
            .unwrap();

        let product = Product {
            name: "freebie".to_string(),
            price: dec!(0),
            extra: Default::default(),
        };
        let result = service.buy_product("9876543210", product).await;
        assert!(matches!(result, Err(ShopError::Validation(_))));
    }
}
