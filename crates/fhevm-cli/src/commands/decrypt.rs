use std::time::Duration;

use anyhow::Result;

use crate::commands::parse_id;
use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::{explain_quantum, Session};

pub async fn run(overrides: &Overrides, job_id: &str, timeout: u64) -> Result<()> {
    let job_id = parse_id(job_id)?;
    let session = Session::open(load_config()?.apply(overrides))?;
    session.connect().await?;

    let sp = output::spinner("Waiting for gateway decryption...");
    let result = tokio::time::timeout(
        Duration::from_secs(timeout),
        session.contract.decrypt_job(job_id),
    )
    .await;
    sp.finish_and_clear();

    let decrypted = match result {
        Ok(r) => r.map_err(|e| explain_quantum(&session.config, e))?,
        Err(_) => {
            return Err(output::fail_with_hint(
                &format!("no decryption result after {timeout}s"),
                "the gateway may still answer; check later with `fhevm watch` or raise --timeout",
            ))
        }
    };

    if output::is_json() {
        output::json_output(serde_json::json!({
            "job_id": job_id.to_string(),
            "request_id": decrypted.request_id.to_string(),
            "value": decrypted.value,
        }));
    } else {
        output::success("job result decrypted");
        output::label("job", &job_id.to_string());
        output::label("request", &decrypted.request_id.to_string());
        output::label("value", &decrypted.value.to_string());
    }
    Ok(())
}
