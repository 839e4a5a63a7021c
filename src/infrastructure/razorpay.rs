use crate::config::GatewayConfig;
use crate::domain::order::{GatewayOrder, OrderRequest};
use crate::domain::ports::PaymentGateway;
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error envelope returned by the Razorpay API.
#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    #[serde(default)]
    description: String,
}

/// `PaymentGateway` adapter over the Razorpay orders API.
///
/// Requests are authenticated with HTTP basic auth (key id / key secret),
/// bounded by a timeout, and retried once on transient transport failures.
#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ShopError::Internal(format!("HTTP client setup failed: {err}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url)
    }

    /// Sends the request, retrying once when the failure is a timeout or a
    /// connection error rather than a remote rejection.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let retry = request.try_clone();
        match request.send().await {
            Ok(response) => Ok(response),
            Err(err) if is_transient(&err) => {
                let Some(retry) = retry else {
                    return Err(transport_error(err));
                };
                tracing::warn!(error = %err, "gateway call failed, retrying once");
                retry.send().await.map_err(transport_error)
            }
            Err(err) => Err(transport_error(err)),
        }
    }

    /// Maps a non-success response to a gateway error carrying the remote
    /// status and description.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let description = match response.json::<GatewayErrorBody>().await {
            Ok(body) if !body.error.description.is_empty() => body.error.description,
            _ => "Payment gateway request failed".to_string(),
        };
        tracing::error!(status = status.as_u16(), %description, "gateway rejected request");
        Err(ShopError::gateway(Some(status.as_u16()), description))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: OrderRequest) -> Result<GatewayOrder> {
        let response = self
            .send(
                self.http
                    .post(self.orders_url())
                    .basic_auth(&self.key_id, Some(&self.key_secret))
                    .json(&request),
            )
            .await?;
        self.check(response)
            .await?
            .json::<GatewayOrder>()
            .await
            .map_err(decode_error)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder> {
        let response = self
            .send(
                self.http
                    .get(format!("{}/{order_id}", self.orders_url()))
                    .basic_auth(&self.key_id, Some(&self.key_secret)),
            )
            .await?;
        self.check(response)
            .await?
            .json::<GatewayOrder>()
            .await
            .map_err(decode_error)
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn transport_error(err: reqwest::Error) -> ShopError {
    tracing::error!(error = %err, "gateway call failed");
    ShopError::gateway(None, format!("Payment gateway unreachable: {err}"))
}

fn decode_error(err: reqwest::Error) -> ShopError {
    ShopError::gateway(None, format!("Unexpected gateway response: {err}"))
}
