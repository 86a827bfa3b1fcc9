// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed Ethereum JSON-RPC calls on top of an [`Eip1193Provider`].

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::provider::{Eip1193Provider, ProviderError, ProviderEvent};

/// Cheap, cloneable handle to the wallet provider.
///
/// Two handles are the same provider iff [`RpcProvider::same_as`] holds.
#[derive(Clone)]
pub struct RpcProvider {
    inner: Arc<dyn Eip1193Provider>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub log_index: Option<U64>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub gas_used: Option<U256>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Pre-byzantium receipts carry no status and count as success.
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| s != U64::ZERO)
    }

    pub fn block(&self) -> Option<u64> {
        self.block_number.map(|b| b.to::<u64>())
    }
}

/// `eth_getLogs` filter for one contract.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    /// Positional topics; `None` matches anything.
    pub topics: Vec<Option<B256>>,
    pub from_block: U64,
    pub to_block: U64,
}

impl RpcProvider {
    pub fn new(inner: Arc<dyn Eip1193Provider>) -> Self {
        Self { inner }
    }

    pub fn same_as(&self, other: &RpcProvider) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProviderEvent> {
        self.inner.subscribe()
    }

    pub async fn request_raw(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.inner.request(method, params).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ProviderError> {
        let value = self.inner.request(method, params).await?;
        serde_json::from_value(value).map_err(|e| ProviderError::Decode {
            method: method.to_string(),
            detail: e.to_string(),
        })
    }

    /// Ask the wallet for account access; may suspend on a user prompt.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request("eth_requestAccounts", json!([])).await
    }

    pub async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request("eth_accounts", json!([])).await
    }

    pub async fn chain_id(&self) -> Result<u64, ProviderError> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    pub async fn block_number(&self) -> Result<u64, ProviderError> {
        let n: U64 = self.request("eth_blockNumber", json!([])).await?;
        Ok(n.to::<u64>())
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256, ProviderError> {
        self.request("eth_getBalance", json!([address, "latest"])).await
    }

    pub async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError> {
        self.request("eth_call", json!([tx, "latest"])).await
    }

    /// Hand the transaction to the wallet for signing and submission.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        self.request("eth_sendTransaction", json!([tx])).await
    }

    pub async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ProviderError> {
        self.request("eth_getLogs", json!([filter])).await
    }
}

impl std::fmt::Debug for RpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcProvider").finish_non_exhaustive()
    }
}
