// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! # quantum-contract
//!
//! Typed binding for the `QuantumPrivacyCompute` demo contract, built on
//! [`fhevm_sdk::ContractDispatch`].
//!
//! | Module | Purpose |
//! |---|---|
//! | [`bindings`] | `sol!` ABI and the `QuantumAbi` capability set |
//! | [`client`] | `QuantumPrivacyCompute`: jobs, state, circuits, queries |
//! | [`decryptor`] | Request + await gateway decryption; `JobDecryptor` |
//! | [`algorithm`] | Algorithm catalogue and amplitude encoding |
//!
//! ```rust,no_run
//! use quantum_contract::{Algorithm, QuantumPrivacyCompute};
//!
//! # async fn example(wallet: fhevm_sdk::WalletManager) -> quantum_contract::QuantumResult<()> {
//! wallet.connect().await?;
//! let contract = QuantumPrivacyCompute::at_default(wallet)?;
//! let job = contract.submit_job(42, Algorithm::Grover).await?;
//! if let Some(id) = job.job_id {
//!     let info = contract.job_info(id).await?;
//!     println!("{info:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod algorithm;
pub mod bindings;
pub mod client;
pub mod decryptor;
pub mod error;

pub use algorithm::{encode_amplitudes, Algorithm, QUBIT_COUNT};
pub use bindings::{IQuantumPrivacyCompute, QuantumAbi};
pub use client::{
    job_id_from_receipt, CircuitInfo, JobInfo, QuantumPrivacyCompute, QuantumStateInfo,
    SubmittedJob, DEFAULT_ADDRESS,
};
pub use decryptor::{decrypted_from_receipt, JobDecryptor};
pub use error::{QuantumError, QuantumResult};
