use anyhow::Result;

use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::{explain_quantum, Session};

pub async fn run(overrides: &Overrides, value: u64) -> Result<()> {
    let session = Session::open(load_config()?.apply(overrides))?;
    let wallet = session.connect().await?;
    let contract = &session.contract;
    let fail = |e| explain_quantum(&session.config, e);

    let sp = output::spinner("Initializing quantum state...");
    let receipt = contract.initialize_state(value).await.map_err(fail)?;
    let info = match wallet.address {
        Some(user) => Some(contract.state_info(user).await.map_err(fail)?),
        None => None,
    };
    sp.finish_and_clear();

    let amplitude = quantum_contract::encode_amplitudes(value)[0];
    if output::is_json() {
        output::json_output(serde_json::json!({
            "tx_hash": receipt.transaction_hash.to_string(),
            "amplitude": amplitude,
            "qubit_count": quantum_contract::QUBIT_COUNT,
            "state": info,
        }));
    } else {
        output::success("quantum state initialized");
        output::label("amplitude value", &amplitude.to_string());
        output::label("tx", &receipt.transaction_hash.to_string());
        if let Some(info) = info {
            output::label("qubits", &info.qubit_count.to_string());
            output::label("entangled", &output::yes_no(info.is_entangled));
            output::label("timestamp", &info.timestamp.to_string());
        }
    }
    Ok(())
}
