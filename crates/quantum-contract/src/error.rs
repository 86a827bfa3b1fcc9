// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

use fhevm_sdk::FhevmError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum QuantumError {
    #[error("algorithm type must be between 0 and 5, got {0}")]
    InvalidAlgorithm(String),

    #[error("decryption is not allowed at this time")]
    DecryptionNotAllowed,

    #[error(transparent)]
    Sdk(#[from] FhevmError),
}

pub type QuantumResult<T> = Result<T, QuantumError>;
