// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Gateway decryption of job results.
//!
//! The contract assigns a request id when the request is mined; the
//! gateway answers with a `QuantumResultDecrypted(requestId, value)` event,
//! either in the request's own receipt or in a later block.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use fhevm_sdk::rpc::TransactionReceipt;
use fhevm_sdk::signer::Signer;
use fhevm_sdk::{
    ContractOptions, DecryptedValue, DecryptionRequest, Decryptor, FhevmError, FhevmResult,
    WalletManager,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::bindings::IQuantumPrivacyCompute as Q;
use crate::client::QuantumPrivacyCompute;
use crate::error::{QuantumError, QuantumResult};

/// Gateway answer carried by `receipt`, if the contract at `contract`
/// emitted `QuantumResultDecrypted` within the same transaction. The
/// event's request id is the one the contract actually assigned.
pub fn decrypted_from_receipt(
    receipt: &TransactionReceipt,
    contract: Address,
) -> Option<DecryptedValue> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == contract)
        .find_map(|log| {
            Q::QuantumResultDecrypted::decode_raw_log(log.topics.iter().copied(), &log.data, true)
                .ok()
        })
        .map(|e| DecryptedValue {
            request_id: e.requestId,
            value: e.decryptedValue,
        })
}

fn request_topic(request_id: U256) -> B256 {
    B256::from(request_id.to_be_bytes::<32>())
}

impl QuantumPrivacyCompute {
    /// Request decryption of `job_id` and wait for the gateway's answer.
    ///
    /// The request id returned by a simulated call only predicts the id the
    /// mined transaction gets. A `QuantumResultDecrypted` in the receipt is
    /// authoritative; the predicted id is used only when the receipt carries
    /// none, to wait for a later answer.
    pub async fn decrypt_job(&self, job_id: U256) -> QuantumResult<DecryptedValue> {
        if !self.is_decryption_allowed().await? {
            return Err(QuantumError::DecryptionNotAllowed);
        }

        let dispatch = self.dispatch();
        let predicted = dispatch
            .call(Q::requestJobDecryptionCall { jobId: job_id })
            .await?
            .requestId;
        debug!(%job_id, %predicted, "predicted decryption request id");

        // must be listening before the request is mined
        let (tx, rx) = oneshot::channel();
        let slot = Mutex::new(Some(tx));
        let sub = dispatch
            .on_filtered(request_topic(predicted), move |e: Q::QuantumResultDecrypted| {
                if let Some(tx) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
                    let _ = tx.send(e.decryptedValue);
                }
            })
            .await?;

        let result: FhevmResult<DecryptedValue> = async {
            let pending = dispatch
                .send(Q::requestJobDecryptionCall { jobId: job_id }, None)
                .await?;
            info!(hash = %pending.hash(), "decryption requested");
            let receipt = dispatch.wait_for_transaction(&pending, 1).await?;

            if let Some(answer) = decrypted_from_receipt(&receipt, self.address()) {
                if answer.request_id != predicted {
                    debug!(
                        %predicted,
                        request_id = %answer.request_id,
                        "request id differs from prediction"
                    );
                }
                return Ok(answer);
            }
            info!(request_id = %predicted, "waiting for gateway response");
            let value = rx.await.map_err(|_| FhevmError::NotInitialized)?;
            Ok(DecryptedValue {
                request_id: predicted,
                value,
            })
        }
        .await;
        sub.unsubscribe();
        Ok(result?)
    }
}

/// [`Decryptor`] for the readiness context. The request's ciphertext
/// handle is the job id.
pub struct JobDecryptor {
    wallet: WalletManager,
    poll_interval: Option<Duration>,
}

impl JobDecryptor {
    pub fn new(wallet: WalletManager) -> Self {
        Self {
            wallet,
            poll_interval: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
}

#[async_trait]
impl Decryptor for JobDecryptor {
    async fn decrypt(
        &self,
        signer: Arc<Signer>,
        request: &DecryptionRequest,
    ) -> FhevmResult<Option<DecryptedValue>> {
        let options = ContractOptions {
            address: request.contract_address,
            signer: Some(signer),
        };
        let mut client = QuantumPrivacyCompute::new(self.wallet.clone(), options);
        if let Some(interval) = self.poll_interval {
            client = client.with_poll_interval(interval);
        }

        match client.decrypt_job(request.ciphertext).await {
            Ok(value) => Ok(Some(value)),
            Err(QuantumError::DecryptionNotAllowed) => {
                warn!(job_id = %request.ciphertext, "decryption not allowed");
                Ok(None)
            }
            Err(QuantumError::Sdk(e)) => Err(e),
            Err(e) => Err(FhevmError::Abi(e.to_string())),
        }
    }
}
