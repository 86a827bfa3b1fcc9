// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! # fhevm-sdk
//!
//! Client library for **fhEVM** confidential contracts.
//!
//! `fhevm-sdk` connects a wallet, encrypts small integers through an FHE
//! library, and calls a confidential contract. Wallet RPC, signing,
//! homomorphic encryption and gateway decryption all stay with the
//! collaborators the host plugs in through [`HostEnvironment`]; this crate
//! holds the state around them (connection, readiness, loading flags).
//!
//! ## Crate layout
//!
//! | Module | Purpose |
//! |---|---|
//! | *crate root* | Re-exports config and value types (`FhevmConfig`, `EncryptedData`, …) |
//! | [`context`] | `FhevmContext`: readiness, wallet passthrough, encrypt/decrypt |
//! | [`wallet`] | Connection state and provider notifications |
//! | [`encryption`] | FHE library seam, instance creation, 8-bit encryption |
//! | [`encryptor`] | Encryption view with its own progress flag |
//! | [`contract`] | Typed `call` / `send` / event listeners for one contract |
//! | [`provider`] | EIP-1193 provider trait and the JSON-RPC `HttpProvider` |
//! | [`rpc`] | Typed Ethereum RPC calls, receipts, logs |
//! | [`signer`] | Wallet-backed signer and pending transactions |
//! | [`format`] | Address, hex and ETH amount helpers |
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! fhevm-sdk = { path = "crates/fhevm-sdk" }
//! ```
//!
//! ## Typical integration flow
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fhevm_sdk::provider::HttpProvider;
//! use fhevm_sdk::{FhevmConfig, FhevmContext, HostEnvironment};
//!
//! # async fn example(fhe: Arc<dyn fhevm_sdk::encryption::FheLibrary>) -> fhevm_sdk::error::FhevmResult<()> {
//! // 1. Describe the host
//! let host = HostEnvironment::new()
//!     .with_wallet(Arc::new(HttpProvider::new("http://127.0.0.1:8545")))
//!     .with_fhe_library(fhe);
//!
//! // 2. Mount the context (initializes the FHE instance in the background)
//! let ctx = FhevmContext::mount(host, Arc::new(FhevmConfig::new(8009)));
//! ctx.settled().await;
//!
//! // 3. Connect and encrypt
//! ctx.connect_wallet().await?;
//! let input = ctx.encrypt(42u8).await?;
//!
//! // 4. Submit through a typed contract binding
//! //    let dispatch = ContractDispatch::<MyAbi>::new(ctx.wallet_manager().clone(), opts);
//! //    let tx = dispatch.send(MyAbi::fooCall { .. }, None).await?;
//! # let _ = input;
//! # Ok(())
//! # }
//! ```

pub use fhevm_types::{
    get_fhe_public_key, get_gateway_url, DecryptedValue, DecryptionRequest, EncryptedData,
    FhevmConfig, NetworkConfig,
};

pub mod context;
pub mod contract;
pub mod encryption;
pub mod encryptor;
pub mod error;
mod flag;
pub mod format;
pub mod host;
#[cfg(any(test, feature = "testutils"))]
pub mod mock;
pub mod provider;
pub mod rpc;
pub mod signer;
pub mod wallet;

pub use context::{Decryptor, FhevmContext, FhevmInstanceState, InitStatus};
pub use contract::{ContractDispatch, ContractOptions, Subscription, TxOptions};
pub use encryptor::Encryptor;
pub use error::{FhevmError, FhevmResult};
pub use host::HostEnvironment;
pub use wallet::{WalletChange, WalletManager, WalletState};

// sol! output in dependents refers to these
pub use alloy_primitives;
pub use alloy_sol_types;
