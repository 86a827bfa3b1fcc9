// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

pub mod chain;
pub mod config;
pub mod data;

pub use chain::{get_fhe_public_key, get_gateway_url, ChainEntry, DEFAULT_CHAIN_ID};
pub use config::{FhevmConfig, NetworkConfig};
pub use data::{DecryptedValue, DecryptionRequest, EncryptedData};
