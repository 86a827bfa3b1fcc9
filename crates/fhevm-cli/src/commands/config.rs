use anyhow::Result;

use crate::config::{config_path, load_config, save_config, Overrides};
use crate::output;

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut config = load_config()?;
    config.set(key, value)?;
    save_config(&config)?;

    if output::is_json() {
        output::json_output(serde_json::json!({ "key": key, "value": value }));
    } else {
        output::success(&format!("{key} = {value}"));
    }
    Ok(())
}

pub fn show(overrides: &Overrides) -> Result<()> {
    let config = load_config()?.apply(overrides);
    let path = config_path()?;

    if output::is_json() {
        output::json_output(serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        }));
        return Ok(());
    }

    let fhevm = config.fhevm_config();
    output::label("file", &path.display().to_string());
    output::label("rpc_url", &config.rpc_url);
    output::label("chain_id", &config.chain_id.to_string());
    output::label("contract_address", &config.contract_address);
    output::label("gateway_url", &fhevm.resolved_gateway_url());
    output::label("public_key", &fhevm.resolved_public_key());
    output::label("poll_interval_ms", &config.poll_interval_ms.to_string());
    Ok(())
}
