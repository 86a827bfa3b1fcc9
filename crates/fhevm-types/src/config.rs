// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Configuration consumed when a readiness context is mounted.

use serde::{Deserialize, Serialize};

use crate::chain::{get_fhe_public_key, get_gateway_url};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FhevmConfig {
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
}

impl FhevmConfig {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            gateway_url: None,
            public_key: None,
            network: None,
        }
    }

    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    pub fn with_network(mut self, name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        self.network = Some(NetworkConfig {
            name: name.into(),
            rpc_url: rpc_url.into(),
        });
        self
    }

    /// Explicit public key, else the chain table entry. An empty key counts as unset.
    pub fn resolved_public_key(&self) -> String {
        non_empty(&self.public_key)
            .unwrap_or_else(|| get_fhe_public_key(self.chain_id))
            .to_string()
    }

    /// Explicit gateway URL, else the chain table entry. An empty URL counts as unset.
    pub fn resolved_gateway_url(&self) -> String {
        non_empty(&self.gateway_url)
            .unwrap_or_else(|| get_gateway_url(self.chain_id))
            .to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win_over_table() {
        let cfg = FhevmConfig::new(8009)
            .with_public_key("pk")
            .with_gateway_url("http://gw");
        assert_eq!(cfg.resolved_public_key(), "pk");
        assert_eq!(cfg.resolved_gateway_url(), "http://gw");
    }

    #[test]
    fn table_used_when_unset() {
        let cfg = FhevmConfig::new(8009);
        assert_eq!(cfg.resolved_public_key(), "YOUR_PUBLIC_KEY_FOR_LOCALHOST");
        assert_eq!(cfg.resolved_gateway_url(), "http://localhost:8009");
    }

    #[test]
    fn empty_values_fall_back_to_table() {
        let cfg = FhevmConfig::new(8009)
            .with_public_key("")
            .with_gateway_url("  ");
        assert_eq!(cfg.resolved_public_key(), "YOUR_PUBLIC_KEY_FOR_LOCALHOST");
        assert_eq!(cfg.resolved_gateway_url(), "http://localhost:8009");

        let cfg: FhevmConfig =
            serde_json::from_str(r#"{"chainId":8009,"publicKey":"","gatewayUrl":""}"#).unwrap();
        assert_eq!(cfg.resolved_public_key(), "YOUR_PUBLIC_KEY_FOR_LOCALHOST");
        assert_eq!(cfg.resolved_gateway_url(), "http://localhost:8009");
    }

    #[test]
    fn json_uses_camel_case() {
        let cfg: FhevmConfig = serde_json::from_str(
            r#"{"chainId":11155111,"network":{"name":"sepolia","rpcUrl":"https://rpc"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.chain_id, 11155111);
        assert!(cfg.gateway_url.is_none());
        assert_eq!(cfg.network.as_ref().unwrap().rpc_url, "https://rpc");

        let json = serde_json::to_value(&FhevmConfig::new(9000)).unwrap();
        assert_eq!(json, serde_json::json!({ "chainId": 9000 }));
    }
}
