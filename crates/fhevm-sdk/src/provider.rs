// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Wallet provider abstraction (EIP-1193 `request` + notifications).
//!
//! [`Eip1193Provider`] is the seam between the SDK and whatever owns the
//! user's accounts. [`HttpProvider`] implements it over JSON-RPC for nodes
//! that manage accounts themselves (anvil, hardhat, geth `--dev`).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use fhevm_sdk::provider::HttpProvider;
//!
//! # async fn example() {
//! let provider = Arc::new(HttpProvider::new("http://127.0.0.1:8545"));
//! // emit accountsChanged / chainChanged by polling the node
//! let _watcher = provider.clone().spawn_watcher(Duration::from_secs(4));
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U64};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// EIP-1193 code for a request the user declined.
pub const USER_REJECTED: i64 = 4001;
/// JSON-RPC code for an unknown method.
pub const METHOD_NOT_FOUND: i64 = -32601;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport: {0}")]
    Transport(String),

    #[error("unexpected response to {method}: {detail}")]
    Decode { method: String, detail: String },
}

impl ProviderError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == USER_REJECTED)
    }

    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == METHOD_NOT_FOUND)
    }
}

/// Provider-level notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Forward a JSON-RPC request to the wallet.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Stream of `accountsChanged` / `chainChanged` notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

// ---------------------------------------------------------------------------
// JSON-RPC over HTTP
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

pub struct HttpProvider {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
    events: broadcast::Sender<ProviderEvent>,
}

impl HttpProvider {
    pub fn new(url: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            url: url.to_string(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = req.id, "rpc request");

        let resp: JsonRpcResponse = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::Decode {
                method: method.to_string(),
                detail: e.to_string(),
            })?;

        if let Some(err) = resp.error {
            return Err(ProviderError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(resp.result.unwrap_or(Value::Null))
    }

    /// Poll `eth_accounts` and `eth_chainId`, broadcasting a notification
    /// whenever either differs from the previous poll.
    pub fn spawn_watcher(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last_accounts: Option<Vec<Address>> = None;
            let mut last_chain: Option<u64> = None;
            loop {
                tokio::time::sleep(interval).await;

                match self.poll_accounts().await {
                    Ok(accounts) => {
                        if last_accounts.as_ref().is_some_and(|prev| *prev != accounts) {
                            let _ = self
                                .events
                                .send(ProviderEvent::AccountsChanged(accounts.clone()));
                        }
                        last_accounts = Some(accounts);
                    }
                    Err(e) => warn!("accounts poll error: {e}"),
                }

                match self.poll_chain_id().await {
                    Ok(chain_id) => {
                        if last_chain.is_some_and(|prev| prev != chain_id) {
                            let _ = self.events.send(ProviderEvent::ChainChanged(chain_id));
                        }
                        last_chain = Some(chain_id);
                    }
                    Err(e) => warn!("chain poll error: {e}"),
                }
            }
        })
    }

    async fn poll_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let value = self.post("eth_accounts", Value::Array(vec![])).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::Decode {
            method: "eth_accounts".into(),
            detail: e.to_string(),
        })
    }

    async fn poll_chain_id(&self) -> Result<u64, ProviderError> {
        let value = self.post("eth_chainId", Value::Array(vec![])).await?;
        serde_json::from_value::<U64>(value)
            .map(|id| id.to::<u64>())
            .map_err(|e| ProviderError::Decode {
                method: "eth_chainId".into(),
                detail: e.to_string(),
            })
    }
}

#[async_trait]
impl Eip1193Provider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match self.post(method, params.clone()).await {
            // nodes without a permission prompt only know eth_accounts
            Err(e) if method == "eth_requestAccounts" && e.is_method_not_found() => {
                self.post("eth_accounts", params).await
            }
            other => other,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
