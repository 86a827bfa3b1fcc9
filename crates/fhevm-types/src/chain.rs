// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Per-chain FHE public key and gateway defaults.
//!
//! Unknown chain ids resolve to the [`DEFAULT_CHAIN_ID`] entry.

/// Chain whose entry is used for any unrecognized chain id.
pub const DEFAULT_CHAIN_ID: u64 = 9000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainEntry {
    pub chain_id: u64,
    pub public_key: &'static str,
    pub gateway_url: &'static str,
}

const CHAINS: &[ChainEntry] = &[
    ChainEntry {
        chain_id: 9000,
        public_key: "YOUR_PUBLIC_KEY_FOR_SEPOLIA",
        gateway_url: "https://gateway.sepolia.zama.ai",
    },
    ChainEntry {
        chain_id: 8009,
        public_key: "YOUR_PUBLIC_KEY_FOR_LOCALHOST",
        gateway_url: "http://localhost:8009",
    },
    ChainEntry {
        chain_id: 11155111,
        public_key: "YOUR_PUBLIC_KEY_FOR_SEPOLIA_11155111",
        gateway_url: "https://gateway.sepolia.zama.ai",
    },
];

impl ChainEntry {
    /// Table entry for `chain_id`, falling back to the default chain.
    pub fn lookup(chain_id: u64) -> &'static ChainEntry {
        CHAINS
            .iter()
            .find(|c| c.chain_id == chain_id)
            .unwrap_or(&CHAINS[0])
    }

    pub fn is_known(chain_id: u64) -> bool {
        CHAINS.iter().any(|c| c.chain_id == chain_id)
    }
}

pub fn get_fhe_public_key(chain_id: u64) -> &'static str {
    ChainEntry::lookup(chain_id).public_key
}

pub fn get_gateway_url(chain_id: u64) -> &'static str {
    ChainEntry::lookup(chain_id).gateway_url
}
