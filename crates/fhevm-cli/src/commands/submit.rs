use anyhow::Result;
use quantum_contract::Algorithm;

use crate::commands::parse_input;
use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::{explain_quantum, Session};

pub async fn run(overrides: &Overrides, input: &str, algorithm: Algorithm) -> Result<()> {
    let value = parse_input(input)?;
    let session = Session::open(load_config()?.apply(overrides))?;
    session.connect().await?;

    let sp = output::spinner("Submitting quantum job...");
    let job = session
        .contract
        .submit_job(value, algorithm)
        .await
        .map_err(|e| explain_quantum(&session.config, e))?;
    sp.finish_and_clear();

    let tx_hash = job.receipt.transaction_hash.to_string();
    if output::is_json() {
        output::json_output(serde_json::json!({
            "job_id": job.job_id.map(|id| id.to_string()),
            "input": value,
            "algorithm": algorithm.name(),
            "tx_hash": tx_hash,
        }));
        return Ok(());
    }

    output::success("quantum job submitted");
    match job.job_id {
        Some(id) => output::label("job id", &id.to_string()),
        None => output::warn("no QuantumJobSubmitted event in receipt; job id unknown"),
    }
    output::label("input", &value.to_string());
    output::label("algorithm", algorithm.name());
    output::label("tx", &tx_hash);
    if let Some(id) = job.job_id {
        output::info(&format!("run `fhevm job {id} --execute` to execute it"));
    }
    Ok(())
}
