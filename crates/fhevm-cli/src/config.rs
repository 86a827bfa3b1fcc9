use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fhevm_sdk::format::is_valid_address;
use fhevm_sdk::FhevmConfig;
use quantum_contract::DEFAULT_ADDRESS;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::output;

pub const ALLOWED_KEYS: &[&str] = &[
    "rpc_url",
    "chain_id",
    "contract_address",
    "gateway_url",
    "public_key",
    "poll_interval_ms",
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CliConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: String,
    pub gateway_url: Option<String>,
    pub public_key: Option<String>,
    pub poll_interval_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".into(),
            chain_id: 8009,
            contract_address: DEFAULT_ADDRESS.into(),
            gateway_url: None,
            public_key: None,
            poll_interval_ms: 4000,
        }
    }
}

/// Global flag / env overrides; they win over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub contract: Option<String>,
}

impl CliConfig {
    pub fn apply(mut self, overrides: &Overrides) -> Self {
        if let Some(url) = &overrides.rpc_url {
            self.rpc_url = url.clone();
        }
        if let Some(addr) = &overrides.contract {
            self.contract_address = addr.clone();
        }
        self
    }

    pub fn fhevm_config(&self) -> FhevmConfig {
        let mut config = FhevmConfig::new(self.chain_id).with_network("cli", self.rpc_url.clone());
        if let Some(url) = &self.gateway_url {
            config = config.with_gateway_url(url.clone());
        }
        if let Some(key) = &self.public_key {
            config = config.with_public_key(key.clone());
        }
        config
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Update one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());
        match key {
            "rpc_url" => self.rpc_url = value.to_string(),
            "chain_id" => {
                self.chain_id = value
                    .parse()
                    .map_err(|_| output::fail_with_hint("chain_id must be an integer", "e.g. 8009"))?
            }
            "contract_address" => {
                if !is_valid_address(value) {
                    return Err(output::fail_with_hint(
                        &format!("invalid address: {value}"),
                        "expected 0x followed by 40 hex characters",
                    ));
                }
                self.contract_address = value.to_string();
            }
            "gateway_url" => self.gateway_url = optional(value),
            "public_key" => self.public_key = optional(value),
            "poll_interval_ms" => {
                self.poll_interval_ms = value.parse().map_err(|_| {
                    output::fail_with_hint("poll_interval_ms must be an integer", "e.g. 4000")
                })?
            }
            _ => {
                return Err(output::fail_with_hint(
                    &format!("unknown config key: {key}"),
                    &format!("allowed keys: {}", ALLOWED_KEYS.join(", ")),
                ))
            }
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".fhevm").join("config.json"))
}

/// Missing file → defaults.
pub fn load_from(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        debug!("no config at {}, using defaults", path.display());
        return Ok(CliConfig::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("cannot read config at {}", path.display()))?;
    serde_json::from_str(&data).context("invalid config JSON")
}

pub fn save_to(path: &Path, config: &CliConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_config() -> Result<CliConfig> {
    load_from(&config_path()?)
}

pub fn save_config(config: &CliConfig) -> Result<()> {
    save_to(&config_path()?, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = load_from(&tmp.path().join("config.json")).unwrap();
        assert_eq!(cfg, CliConfig::default());
        assert_eq!(cfg.chain_id, 8009);
        assert_eq!(cfg.contract_address, DEFAULT_ADDRESS);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let mut cfg = CliConfig::default();
        cfg.set("chain_id", "11155111").unwrap();
        cfg.set("gateway_url", "https://gw.example").unwrap();
        save_to(&path, &cfg).unwrap();

        let loaded = load_from(&path).unwrap();
        assert_eq!(loaded.chain_id, 11155111);
        assert_eq!(loaded.gateway_url.as_deref(), Some("https://gw.example"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "rpc_url": "http://node:8545" }"#).unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.rpc_url, "http://node:8545");
        assert_eq!(cfg.poll_interval_ms, 4000);
    }

    #[test]
    fn set_validates_keys_and_values() {
        let mut cfg = CliConfig::default();
        assert!(cfg.set("indexer_url", "x").is_err());
        assert!(cfg.set("chain_id", "sepolia").is_err());
        assert!(cfg.set("contract_address", "0x1234").is_err());
        cfg.set("public_key", "").unwrap();
        assert!(cfg.public_key.is_none());
    }

    #[test]
    fn overrides_win_over_file() {
        let cfg = CliConfig::default().apply(&Overrides {
            rpc_url: Some("http://other:8545".into()),
            contract: None,
        });
        assert_eq!(cfg.rpc_url, "http://other:8545");
        assert_eq!(cfg.contract_address, DEFAULT_ADDRESS);
    }

    #[test]
    fn fhevm_config_uses_explicit_values() {
        let mut cfg = CliConfig::default();
        cfg.set("public_key", "PK").unwrap();
        let fhevm = cfg.fhevm_config();
        assert_eq!(fhevm.chain_id, 8009);
        assert_eq!(fhevm.resolved_public_key(), "PK");
        assert_eq!(fhevm.resolved_gateway_url(), "http://localhost:8009");
    }
}
