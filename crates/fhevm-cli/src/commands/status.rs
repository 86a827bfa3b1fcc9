use anyhow::Result;
use colored::Colorize;
use fhevm_sdk::rpc::RpcProvider;
use fhevm_types::chain::ChainEntry;

use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::Session;

pub async fn run(overrides: &Overrides) -> Result<()> {
    let config = load_config()?.apply(overrides);
    let session = Session::open(config)?;
    let fhevm = session.config.fhevm_config();

    let sp = output::spinner("Checking node...");
    let rpc = RpcProvider::new(session.provider.clone());
    let node_chain = rpc.chain_id().await.ok();
    let block = rpc.block_number().await.ok();
    session.ctx.settled().await;
    let wallet = match node_chain {
        Some(_) => session.ctx.connect_wallet().await.ok(),
        None => None,
    };
    let decryption_allowed = match &wallet {
        Some(_) => session.contract.is_decryption_allowed().await.ok(),
        None => None,
    };
    let account = wallet.as_ref().and_then(|w| w.address);
    sp.finish_and_clear();

    let fhe_error = session.ctx.error().map(|e| e.to_string());
    let known_chain = ChainEntry::is_known(fhevm.chain_id);

    if output::is_json() {
        output::json_output(serde_json::json!({
            "rpc_url": session.config.rpc_url,
            "node_reachable": node_chain.is_some(),
            "node_chain_id": node_chain,
            "block_number": block,
            "chain_id": fhevm.chain_id,
            "chain_known": known_chain,
            "gateway_url": fhevm.resolved_gateway_url(),
            "public_key": fhevm.resolved_public_key(),
            "fhe_ready": session.ctx.is_ready(),
            "fhe_error": fhe_error,
            "account": account,
            "contract": session.config.contract_address,
            "decryption_allowed": decryption_allowed,
        }));
        return Ok(());
    }

    let node_str = match (node_chain, block) {
        (Some(id), Some(b)) => format!("{} ({}, chain {id}, block {b})", "reachable".green(), session.config.rpc_url),
        (Some(id), None) => format!("{} ({}, chain {id})", "reachable".green(), session.config.rpc_url),
        _ => format!("{} ({})", "unreachable".red(), session.config.rpc_url),
    };
    output::label("node", &node_str);
    if node_chain.is_some_and(|id| id != fhevm.chain_id) {
        output::warn(&format!(
            "node chain differs from configured chain_id {}",
            fhevm.chain_id
        ));
    }

    let chain_str = if known_chain {
        fhevm.chain_id.to_string()
    } else {
        format!("{} (unknown, using defaults)", fhevm.chain_id)
    };
    output::label("chain", &chain_str);
    output::label("gateway", &fhevm.resolved_gateway_url());
    output::label("public key", &fhevm.resolved_public_key());

    let fhe_str = match &fhe_error {
        None if session.ctx.is_ready() => "ready".green().to_string(),
        Some(e) => format!("{} ({e})", "not ready".yellow()),
        None => "initializing".yellow().to_string(),
    };
    output::label("fhe", &fhe_str);
    match account {
        Some(a) => output::label("account", &a.to_string()),
        None => output::label("account", &"not connected".yellow().to_string()),
    }
    output::label("contract", &session.config.contract_address);
    if let Some(allowed) = decryption_allowed {
        output::label("decryption allowed", &output::yes_no(allowed));
    }
    Ok(())
}
