//! Thin wrappers around the wallet/withdrawal HTTP collaborator and the
//! third-party price feed.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ClientError;

/// Main wallet balance as reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalance {
    pub success: bool,
    pub balance: f64,
    #[serde(rename = "balanceUSD")]
    pub balance_usd: f64,
}

#[derive(Debug, Serialize)]
struct WithdrawBody<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "walletAddress")]
    wallet_address: &'a str,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct WithdrawResponse {
    success: bool,
    #[serde(rename = "withdrawnAmountUSD", default)]
    withdrawn_amount_usd: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

/// Result of a successful withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawReceipt {
    pub withdrawn_usd: f64,
}

/// HTTP client for the wallet collaborator APIs.
pub struct WalletClient {
    http: reqwest::Client,
    api_url: String,
    price_url: String,
}

impl WalletClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            price_url: config.price_url.clone(),
        }
    }

    /// `GET /api/wallet/main/balance`.
    pub async fn balance(&self) -> Result<WalletBalance, ClientError> {
        let body: WalletBalance = self
            .http
            .get(format!("{}/api/wallet/main/balance", self.api_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !body.success {
            return Err(ClientError::RemoteRejection(
                "balance lookup failed".to_string(),
            ));
        }
        Ok(body)
    }

    /// `POST /api/withdraw`. Empty addresses and non-positive amounts are
    /// rejected locally before any network call.
    pub async fn withdraw(
        &self,
        user_id: &str,
        wallet_address: &str,
        amount: f64,
    ) -> Result<WithdrawReceipt, ClientError> {
        let wallet_address = wallet_address.trim();
        if wallet_address.is_empty() {
            return Err(ClientError::Validation(
                "wallet address is required".to_string(),
            ));
        }
        if amount <= 0.0 {
            return Err(ClientError::Validation(
                "withdrawal amount must be positive".to_string(),
            ));
        }

        let body: WithdrawResponse = self
            .http
            .post(format!("{}/api/withdraw", self.api_url))
            .json(&WithdrawBody {
                user_id,
                wallet_address,
                amount,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !body.success {
            return Err(ClientError::RemoteRejection(
                body.message
                    .unwrap_or_else(|| "withdrawal rejected".to_string()),
            ));
        }
        Ok(WithdrawReceipt {
            withdrawn_usd: body.withdrawn_amount_usd.unwrap_or(0.0),
        })
    }

    /// Current SOL/USD quote from the price feed.
    pub async fn sol_price_usd(&self) -> Result<f64, ClientError> {
        let body: serde_json::Value = self
            .http
            .get(&self.price_url)
            .query(&[("ids", "solana"), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body["solana"]["usd"]
            .as_f64()
            .ok_or_else(|| ClientError::RemoteRejection("malformed price response".to_string()))
    }
}
