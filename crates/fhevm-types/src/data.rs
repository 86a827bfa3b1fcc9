// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Ciphertext produced by a single `encrypt` call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    pub data: Vec<u8>,
    /// Always empty: the FHE instance does not hand back an input signature.
    pub signature: String,
}

impl EncryptedData {
    pub fn unsigned(data: Vec<u8>) -> Self {
        Self {
            data,
            signature: String::new(),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", alloy_primitives::hex::encode(&self.data))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionRequest {
    /// On-chain handle of the value to decrypt.
    pub ciphertext: U256,
    pub contract_address: Address,
    pub user_address: Address,
}

/// Plaintext published by the gateway for a decryption request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedValue {
    pub request_id: U256,
    pub value: u8,
}
