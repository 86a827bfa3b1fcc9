// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Account handle that signs through the wallet, and pending transactions.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256};
use tracing::debug;

use crate::error::{FhevmError, FhevmResult};
use crate::rpc::{RpcProvider, TransactionReceipt, TransactionRequest};

/// Default receipt polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// An account of the connected wallet. Shared as `Arc<Signer>`; identity
/// (not address equality) decides whether a contract binding is stale.
#[derive(Debug)]
pub struct Signer {
    address: Address,
    provider: RpcProvider,
}

impl Signer {
    pub fn new(address: Address, provider: RpcProvider) -> Arc<Self> {
        Arc::new(Self { address, provider })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &RpcProvider {
        &self.provider
    }

    /// Fill `from` and submit through the wallet.
    pub async fn send_transaction(
        &self,
        mut tx: TransactionRequest,
        poll_interval: Duration,
    ) -> FhevmResult<PendingTransaction> {
        tx.from = Some(self.address);
        let hash = self.provider.send_transaction(&tx).await?;
        debug!(%hash, to = %tx.to, "transaction submitted");
        Ok(PendingTransaction {
            hash,
            request: tx,
            provider: self.provider.clone(),
            poll_interval,
        })
    }
}

/// A submitted transaction that may not be mined yet.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    hash: B256,
    request: TransactionRequest,
    provider: RpcProvider,
    poll_interval: Duration,
}

impl PendingTransaction {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    /// Suspend until the receipt is `confirmations` blocks deep
    /// (`0` is treated as `1`). A reverted receipt is an error.
    pub async fn wait(&self, confirmations: u64) -> FhevmResult<TransactionReceipt> {
        let confirmations = confirmations.max(1);
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(self.hash).await? {
                if !receipt.succeeded() {
                    return Err(FhevmError::TransactionReverted(self.hash));
                }
                if let Some(mined_at) = receipt.block() {
                    let head = self.provider.block_number().await?;
                    if head + 1 >= mined_at + confirmations {
                        return Ok(receipt);
                    }
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
