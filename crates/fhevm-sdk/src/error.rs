// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Typed errors for every SDK operation.
//!
//! [`FhevmError`] is `Clone` so the same failure can be kept in a state
//! slot (context `error`, dispatch `error`) and returned to the caller.

use std::sync::Arc;

use alloy_primitives::B256;

use crate::provider::ProviderError;

/// Underlying cause reported by an external collaborator.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FhevmError {
    #[error("wallet provider not detected; install or configure a wallet")]
    ProviderUnavailable,

    #[error("fhe library not loaded")]
    LibraryUnavailable,

    #[error("fhe instance initialization failed: {0}")]
    InitializationFailed(#[source] SharedError),

    #[error("value must be between 0 and 255, got {0}")]
    InvalidRange(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("contract not initialized")]
    NotInitialized,

    #[error("wallet not connected")]
    WalletNotConnected,

    #[error("fhevm instance not ready")]
    NotReady,

    #[error("encryption failed: {0}")]
    Encryption(#[source] SharedError),

    #[error("transaction {0} reverted")]
    TransactionReverted(B256),

    #[error("abi: {0}")]
    Abi(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl FhevmError {
    pub(crate) fn initialization(e: anyhow::Error) -> Self {
        Self::InitializationFailed(shared(e))
    }

    pub(crate) fn encryption(e: anyhow::Error) -> Self {
        Self::Encryption(shared(e))
    }

    /// True when the wallet user declined the request.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Provider(p) if p.is_user_rejection())
    }
}

impl From<alloy_sol_types::Error> for FhevmError {
    fn from(e: alloy_sol_types::Error) -> Self {
        Self::Abi(e.to_string())
    }
}

fn shared(e: anyhow::Error) -> SharedError {
    let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = e.into();
    Arc::from(boxed)
}

pub type FhevmResult<T> = Result<T, FhevmError>;
