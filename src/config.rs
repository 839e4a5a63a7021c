use thiserror::Error;

pub const ENV_KEY_ID: &str = "RAZORPAY_KEY_ID";
pub const ENV_KEY_SECRET: &str = "RAZORPAY_KEY_SECRET";
pub const ENV_BASE_URL: &str = "RAZORPAY_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com/v1";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{ENV_KEY_ID} must be set")]
    MissingKeyId,
    #[error("{ENV_KEY_SECRET} must be set")]
    MissingKeySecret,
}

/// Gateway credentials and endpoint, loaded from the environment.
///
/// The process refuses to start without both the key id and the secret; the
/// secret doubles as the HMAC key for callback signatures.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Testable constructor taking an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let key_id = lookup(ENV_KEY_ID)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingKeyId)?;
        let key_secret = lookup(ENV_KEY_SECRET)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingKeySecret)?;
        let base_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            key_id,
            key_secret,
            base_url,
        })
    }
}
