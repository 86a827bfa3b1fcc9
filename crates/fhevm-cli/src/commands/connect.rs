use anyhow::Result;
use fhevm_sdk::format::format_address;

use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::Session;

pub async fn run(overrides: &Overrides) -> Result<()> {
    let session = Session::open(load_config()?.apply(overrides))?;
    let state = session.connect().await?;

    let address = state.address.map(|a| a.to_string()).unwrap_or_default();
    let balance = state.balance.clone().unwrap_or_default();

    if output::is_json() {
        output::json_output(serde_json::json!({
            "address": address,
            "chain_id": state.chain_id,
            "balance_eth": balance,
        }));
    } else {
        output::success("wallet connected");
        output::label("account", &format_address(&address));
        if let Some(id) = state.chain_id {
            output::label("chain", &id.to_string());
        }
        output::label("balance", &format!("{balance} ETH"));
    }
    Ok(())
}
