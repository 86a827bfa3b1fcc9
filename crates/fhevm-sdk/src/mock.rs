// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! In-memory wallet provider and FHE library for tests.
//!
//! Enabled for this crate's own tests and, through the `testutils`
//! feature, for downstream crates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_sol_types::SolCall;
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::encryption::{FheInstance, FheLibrary, InstanceParams};
use crate::provider::{Eip1193Provider, ProviderError, ProviderEvent, METHOD_NOT_FOUND, USER_REJECTED};
use crate::rpc::{Log, TransactionReceipt};

type Observer = Box<dyn Fn(&str) + Send + Sync>;

struct ChainState {
    accounts: Vec<Address>,
    balance: U256,
    reject_accounts: bool,
    block: u64,
    requests: Vec<String>,
    calls: Vec<Value>,
    sent: Vec<Value>,
    call_responses: HashMap<[u8; 4], Bytes>,
    receipts: HashMap<B256, TransactionReceipt>,
    next_receipt_logs: Vec<Log>,
    revert_next: bool,
    logs: Vec<Log>,
}

/// Wallet + node in one: authorizes three accounts, mines every
/// transaction into its own block, and serves `eth_getLogs` from
/// whatever the test pushed.
pub struct MockProvider {
    chain_id: u64,
    state: Mutex<ChainState>,
    events: broadcast::Sender<ProviderEvent>,
    observer: Mutex<Option<Observer>>,
}

impl MockProvider {
    pub fn new(chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            chain_id,
            state: Mutex::new(ChainState {
                accounts: (0..3).map(Self::account).collect(),
                balance: U256::ZERO,
                reject_accounts: false,
                block: 100,
                requests: Vec::new(),
                calls: Vec::new(),
                sent: Vec::new(),
                call_responses: HashMap::new(),
                receipts: HashMap::new(),
                next_receipt_logs: Vec::new(),
                revert_next: false,
                logs: Vec::new(),
            }),
            events,
            observer: Mutex::new(None),
        }
    }

    /// The `i`th authorized account.
    pub fn account(i: u8) -> Address {
        Address::repeat_byte(0x10 + i)
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_balance(&self, wei: U256) {
        self.lock().balance = wei;
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.lock().accounts = accounts;
    }

    /// Make `eth_requestAccounts` fail with the user-rejection code.
    pub fn reject_account_requests(&self, reject: bool) {
        self.lock().reject_accounts = reject;
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    /// Methods received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self, method: &str) -> usize {
        self.lock().requests.iter().filter(|m| *m == method).count()
    }

    /// Raw `eth_call` transaction objects.
    pub fn calls(&self) -> Vec<Value> {
        self.lock().calls.clone()
    }

    /// Raw `eth_sendTransaction` transaction objects.
    pub fn sent_transactions(&self) -> Vec<Value> {
        self.lock().sent.clone()
    }

    /// ABI-encoded return data for every `eth_call` to `C`.
    pub fn respond<C: SolCall>(&self, data: impl Into<Bytes>) {
        self.lock().call_responses.insert(C::SELECTOR, data.into());
    }

    /// Logs attached to the receipt of the next sent transaction.
    pub fn queue_receipt_logs(&self, logs: Vec<Log>) {
        self.lock().next_receipt_logs = logs;
    }

    pub fn revert_next_transaction(&self) {
        self.lock().revert_next = true;
    }

    /// Mine `log` into the next block.
    pub fn push_log(&self, mut log: Log) {
        let mut state = self.lock();
        state.block += 1;
        log.block_number = Some(U64::from(state.block));
        state.logs.push(log);
    }

    pub fn block(&self) -> u64 {
        self.lock().block
    }

    /// Called with the method name before each request is served.
    pub fn on_request(&self, f: impl Fn(&str) + Send + Sync + 'static) {
        *self.observer.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(f));
    }

    fn serve(&self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.lock();
        state.requests.push(method.to_string());

        match method {
            "eth_requestAccounts" if state.reject_accounts => Err(ProviderError::Rpc {
                code: USER_REJECTED,
                message: "User rejected the request.".into(),
            }),
            "eth_requestAccounts" | "eth_accounts" => Ok(json!(state.accounts)),
            "eth_chainId" => Ok(json!(U64::from(self.chain_id))),
            "eth_blockNumber" => {
                state.block += 1;
                Ok(json!(U64::from(state.block)))
            }
            "eth_getBalance" => Ok(json!(state.balance)),
            "eth_call" => {
                let tx = params[0].clone();
                let selector = selector_of(&tx);
                state.calls.push(tx);
                selector
                    .and_then(|s| state.call_responses.get(&s).cloned())
                    .map(|data| json!(data))
                    .ok_or_else(|| ProviderError::Rpc {
                        code: -32000,
                        message: "execution reverted".into(),
                    })
            }
            "eth_sendTransaction" => {
                let tx = params[0].clone();
                let from: Address = serde_json::from_value(tx["from"].clone())
                    .map_err(|e| ProviderError::Rpc {
                        code: -32602,
                        message: format!("invalid from: {e}"),
                    })?;
                let to: Option<Address> = serde_json::from_value(tx["to"].clone()).ok();
                state.sent.push(tx);
                state.block += 1;

                let hash = B256::from(U256::from(state.sent.len()).to_be_bytes::<32>());
                let block = U64::from(state.block);
                let mut logs = std::mem::take(&mut state.next_receipt_logs);
                for log in &mut logs {
                    log.block_number = Some(block);
                    log.transaction_hash = Some(hash);
                }
                state.logs.extend(logs.iter().cloned());

                let status = if std::mem::take(&mut state.revert_next) { 0u64 } else { 1 };
                state.receipts.insert(
                    hash,
                    TransactionReceipt {
                        transaction_hash: hash,
                        block_number: Some(block),
                        status: Some(U64::from(status)),
                        gas_used: Some(U256::from(21_000u64)),
                        from,
                        to,
                        logs,
                    },
                );
                Ok(json!(hash))
            }
            "eth_getTransactionReceipt" => {
                let hash: B256 = serde_json::from_value(params[0].clone()).map_err(|e| {
                    ProviderError::Rpc {
                        code: -32602,
                        message: e.to_string(),
                    }
                })?;
                Ok(state.receipts.get(&hash).map_or(Value::Null, |r| json!(r)))
            }
            "eth_getLogs" => {
                let filter = &params[0];
                let matching: Vec<&Log> = state
                    .logs
                    .iter()
                    .filter(|log| log_matches(log, filter))
                    .collect();
                Ok(json!(matching))
            }
            _ => Err(ProviderError::Rpc {
                code: METHOD_NOT_FOUND,
                message: format!("method {method} not supported"),
            }),
        }
    }
}

fn selector_of(tx: &Value) -> Option<[u8; 4]> {
    let data: Bytes = serde_json::from_value(tx["data"].clone()).ok()?;
    data.get(..4)?.try_into().ok()
}

fn log_matches(log: &Log, filter: &Value) -> bool {
    let quantity = |v: &Value| serde_json::from_value::<U64>(v.clone()).ok().map(|n| n.to::<u64>());
    let block = log.block_number.map_or(0, |b| b.to::<u64>());

    if let Ok(address) = serde_json::from_value::<Address>(filter["address"].clone()) {
        if log.address != address {
            return false;
        }
    }
    if quantity(&filter["fromBlock"]).is_some_and(|from| block < from) {
        return false;
    }
    if quantity(&filter["toBlock"]).is_some_and(|to| block > to) {
        return false;
    }
    let topics = filter["topics"].as_array().cloned().unwrap_or_default();
    topics.iter().enumerate().all(|(i, want)| {
        match serde_json::from_value::<Option<B256>>(want.clone()) {
            Ok(Some(want)) => log.topics.get(i) == Some(&want),
            _ => true,
        }
    })
}

#[async_trait]
impl Eip1193Provider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        if let Some(observe) = self
            .observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            observe(method);
        }
        tokio::task::yield_now().await;
        self.serve(method, &params)
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// Deterministic stand-in for an FHE library.
#[derive(Default)]
pub struct MockFheLibrary {
    fail: Option<String>,
    created: Mutex<Vec<InstanceParams>>,
    encrypts: Arc<AtomicUsize>,
}

struct MockInstance {
    encrypts: Arc<AtomicUsize>,
}

impl MockFheLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A library whose `create_instance` always fails with `msg`.
    pub fn failing(msg: &str) -> Self {
        Self {
            fail: Some(msg.to_string()),
            ..Self::default()
        }
    }

    /// Parameters of every instance created so far.
    pub fn created(&self) -> Vec<InstanceParams> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypts.load(Ordering::SeqCst)
    }

    pub fn ciphertext_for(value: u8) -> Vec<u8> {
        vec![0xfe, value, !value]
    }
}

#[async_trait]
impl FheLibrary for MockFheLibrary {
    async fn create_instance(&self, params: InstanceParams) -> anyhow::Result<Arc<dyn FheInstance>> {
        if let Some(msg) = &self.fail {
            return Err(anyhow!("{msg}"));
        }
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(params);
        Ok(Arc::new(MockInstance {
            encrypts: self.encrypts.clone(),
        }))
    }
}

#[async_trait]
impl FheInstance for MockInstance {
    async fn encrypt8(&self, value: u8) -> anyhow::Result<Vec<u8>> {
        self.encrypts.fetch_add(1, Ordering::SeqCst);
        Ok(MockFheLibrary::ciphertext_for(value))
    }
}
