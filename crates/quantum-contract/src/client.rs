// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed client for `QuantumPrivacyCompute`.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent};
use fhevm_sdk::contract::HasCall;
use fhevm_sdk::rpc::TransactionReceipt;
use fhevm_sdk::signer::PendingTransaction;
use fhevm_sdk::{ContractDispatch, ContractOptions, Subscription, WalletManager};
use serde::Serialize;
use tracing::{debug, info};

use crate::algorithm::{encode_amplitudes, Algorithm, QUBIT_COUNT};
use crate::bindings::{IQuantumPrivacyCompute as Q, QuantumAbi};
use crate::error::QuantumResult;

/// Address of the demo deployment.
pub const DEFAULT_ADDRESS: &str = "0xF7d1BFA0fa5b68099F5Cc85856515F7b290c92e2";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobInfo {
    pub job_id: U256,
    pub submitter: Address,
    pub algorithm_type: u8,
    pub is_completed: bool,
    pub is_verified: bool,
    /// Unix seconds.
    pub submit_time: u64,
    /// Unix seconds; `None` while the job is pending.
    pub complete_time: Option<u64>,
    pub gas_used: U256,
}

impl JobInfo {
    pub fn algorithm(&self) -> Option<Algorithm> {
        Algorithm::try_from(self.algorithm_type).ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuantumStateInfo {
    pub qubit_count: u8,
    pub is_entangled: bool,
    pub timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CircuitInfo {
    pub gate_types: Vec<u8>,
    pub target_qubits: Vec<u8>,
    pub is_compiled: bool,
    pub depth: U256,
}

/// Outcome of [`QuantumPrivacyCompute::submit_job`].
#[derive(Clone, Debug)]
pub struct SubmittedJob {
    /// `None` when the receipt carried no parseable `QuantumJobSubmitted`.
    pub job_id: Option<U256>,
    pub receipt: TransactionReceipt,
}

/// First `QuantumJobSubmitted` job id in `receipt`. Logs of other shapes
/// are skipped.
pub fn job_id_from_receipt(receipt: &TransactionReceipt) -> Option<U256> {
    receipt.logs.iter().find_map(|log| {
        match Q::QuantumJobSubmitted::decode_raw_log(log.topics.iter().copied(), &log.data, true) {
            Ok(event) => Some(event.jobId),
            Err(e) => {
                debug!("skipping log: {e}");
                None
            }
        }
    })
}

pub struct QuantumPrivacyCompute {
    dispatch: ContractDispatch<QuantumAbi>,
}

impl QuantumPrivacyCompute {
    pub fn new(wallet: WalletManager, options: ContractOptions) -> Self {
        Self {
            dispatch: ContractDispatch::new(wallet, options),
        }
    }

    /// Bind to the demo deployment.
    pub fn at_default(wallet: WalletManager) -> QuantumResult<Self> {
        Ok(Self::new(wallet, ContractOptions::new(DEFAULT_ADDRESS)?))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.dispatch = self.dispatch.with_poll_interval(interval);
        self
    }

    pub fn dispatch(&self) -> &ContractDispatch<QuantumAbi> {
        &self.dispatch
    }

    pub fn address(&self) -> Address {
        self.dispatch.address()
    }

    async fn transact<C>(&self, call: C) -> QuantumResult<TransactionReceipt>
    where
        C: SolCall,
        QuantumAbi: HasCall<C>,
    {
        let tx: PendingTransaction = self.dispatch.send(call, None).await?;
        info!(hash = %tx.hash(), "transaction sent");
        Ok(self.dispatch.wait_for_transaction(&tx, 1).await?)
    }

    /// Store `value` as a 3-qubit state (amplitude slot 0).
    pub async fn initialize_state(&self, value: u64) -> QuantumResult<TransactionReceipt> {
        self.transact(Q::initializeQuantumStateCall {
            amplitudes: encode_amplitudes(value),
            qubitCount: QUBIT_COUNT,
        })
        .await
    }

    pub async fn submit_job(&self, input: u8, algorithm: Algorithm) -> QuantumResult<SubmittedJob> {
        let receipt = self
            .transact(Q::submitQuantumJobCall {
                encryptedInput: input,
                algorithmType: algorithm.id(),
            })
            .await?;
        let job_id = job_id_from_receipt(&receipt);
        info!(job_id = ?job_id, %algorithm, "quantum job submitted");
        Ok(SubmittedJob { job_id, receipt })
    }

    pub async fn execute_job(&self, job_id: U256) -> QuantumResult<TransactionReceipt> {
        self.transact(Q::executeQuantumAlgorithmCall { jobId: job_id })
            .await
    }

    pub async fn create_entanglement(&self, partner: Address) -> QuantumResult<TransactionReceipt> {
        self.transact(Q::createEntanglementCall { partner }).await
    }

    pub async fn compile_circuit(
        &self,
        circuit_id: U256,
        gate_types: Vec<u8>,
        target_qubits: Vec<u8>,
        control_qubits: Vec<u8>,
    ) -> QuantumResult<TransactionReceipt> {
        self.transact(Q::compileQuantumCircuitCall {
            circuitId: circuit_id,
            gateTypes: gate_types,
            targetQubits: target_qubits,
            controlQubits: control_qubits,
        })
        .await
    }

    /// `None` when the contract reports a zero submitter (no such job).
    pub async fn job_info(&self, job_id: U256) -> QuantumResult<Option<JobInfo>> {
        let r = self.dispatch.call(Q::getJobInfoCall { jobId: job_id }).await?;
        if r.submitter == Address::ZERO {
            return Ok(None);
        }
        Ok(Some(JobInfo {
            job_id,
            submitter: r.submitter,
            algorithm_type: r.algorithmType,
            is_completed: r.isCompleted,
            is_verified: r.isVerified,
            submit_time: r.submitTime.saturating_to(),
            complete_time: (!r.completeTime.is_zero()).then(|| r.completeTime.saturating_to()),
            gas_used: r.gasUsed,
        }))
    }

    pub async fn state_info(&self, user: Address) -> QuantumResult<QuantumStateInfo> {
        let r = self
            .dispatch
            .call(Q::getQuantumStateInfoCall { user })
            .await?;
        Ok(QuantumStateInfo {
            qubit_count: r.qubitCount,
            is_entangled: r.isEntangled,
            timestamp: r.timestamp.saturating_to(),
        })
    }

    pub async fn job_history(&self, user: Address) -> QuantumResult<Vec<U256>> {
        let r = self.dispatch.call(Q::getUserJobHistoryCall { user }).await?;
        Ok(r.jobIds)
    }

    pub async fn circuit_info(&self, circuit_id: U256) -> QuantumResult<CircuitInfo> {
        let r = self
            .dispatch
            .call(Q::getCircuitInfoCall {
                circuitId: circuit_id,
            })
            .await?;
        Ok(CircuitInfo {
            gate_types: r.gateTypes,
            target_qubits: r.targetQubits,
            is_compiled: r.isCompiled,
            depth: r.depth,
        })
    }

    pub async fn job_result(&self, job_id: U256) -> QuantumResult<Bytes> {
        let r = self.dispatch.call(Q::getJobResultCall { jobId: job_id }).await?;
        Ok(r.result)
    }

    pub async fn is_decryption_allowed(&self) -> QuantumResult<bool> {
        let r = self.dispatch.call(Q::isDecryptionAllowedCall {}).await?;
        Ok(r.allowed)
    }

    /// Stream `QuantumJobSubmitted` events to `callback`.
    pub async fn on_job_submitted<F>(&self, callback: F) -> QuantumResult<Subscription>
    where
        F: Fn(Q::QuantumJobSubmitted) + Send + Sync + 'static,
    {
        Ok(self.dispatch.on(callback).await?)
    }

    pub async fn on_job_completed<F>(&self, callback: F) -> QuantumResult<Subscription>
    where
        F: Fn(Q::QuantumJobCompleted) + Send + Sync + 'static,
    {
        Ok(self.dispatch.on(callback).await?)
    }
}
