use anyhow::Result;
use colored::Colorize;
use quantum_contract::{Algorithm, JobInfo};

use crate::commands::parse_id;
use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::{explain_quantum, Session};

pub async fn run(overrides: &Overrides, id: Option<&str>, execute: bool) -> Result<()> {
    let session = Session::open(load_config()?.apply(overrides))?;
    match id {
        Some(id) => show(&session, id, execute).await,
        None => history(&session).await,
    }
}

async fn show(session: &Session, id: &str, execute: bool) -> Result<()> {
    let job_id = parse_id(id)?;
    let fail = |e| explain_quantum(&session.config, e);

    if execute {
        session.connect().await?;
        let sp = output::spinner("Executing quantum job...");
        let receipt = session.contract.execute_job(job_id).await.map_err(fail)?;
        sp.finish_and_clear();
        output::success(&format!("job {job_id} executed"));
        output::label("tx", &receipt.transaction_hash.to_string());
    } else {
        // reads go through the node provider without an account
        session.connect().await.ok();
    }

    let sp = output::spinner("Fetching job...");
    let info = session.contract.job_info(job_id).await.map_err(fail)?;
    sp.finish_and_clear();

    let Some(info) = info else {
        if output::is_json() {
            output::json_output(serde_json::json!({ "job_id": job_id.to_string(), "exists": false }));
            return Ok(());
        }
        return Err(output::fail_with_hint(
            &format!("job {job_id} does not exist"),
            "list your jobs with `fhevm job`",
        ));
    };

    if output::is_json() {
        output::json_output(serde_json::json!({ "exists": true, "job": info }));
        return Ok(());
    }
    print_job(&info);
    Ok(())
}

fn print_job(info: &JobInfo) {
    let algorithm = info
        .algorithm()
        .map(|a: Algorithm| a.name().to_string())
        .unwrap_or_else(|| format!("unknown ({})", info.algorithm_type));
    output::label("job", &info.job_id.to_string());
    output::label("submitter", &info.submitter.to_string());
    output::label("algorithm", &algorithm);
    output::label("completed", &output::yes_no(info.is_completed));
    output::label("verified", &output::yes_no(info.is_verified));
    output::label("submitted at", &info.submit_time.to_string());
    match info.complete_time {
        Some(t) => output::label("completed at", &t.to_string()),
        None => output::label("completed at", &"pending".yellow().to_string()),
    }
    output::label("gas used", &info.gas_used.to_string());
}

async fn history(session: &Session) -> Result<()> {
    let wallet = session.connect().await?;
    let Some(user) = wallet.address else {
        return Err(output::fail_with_hint("no account connected", "run `fhevm connect`"));
    };

    let sp = output::spinner("Fetching job history...");
    let jobs = session
        .contract
        .job_history(user)
        .await
        .map_err(|e| explain_quantum(&session.config, e))?;
    sp.finish_and_clear();

    if output::is_json() {
        let ids: Vec<String> = jobs.iter().map(|id| id.to_string()).collect();
        output::json_output(serde_json::json!({ "account": user, "jobs": ids }));
        return Ok(());
    }

    output::label("account", &user.to_string());
    if jobs.is_empty() {
        output::info("no jobs submitted");
        return Ok(());
    }
    output::label("jobs", &jobs.len().to_string());
    for id in &jobs {
        println!("{id}");
    }
    Ok(())
}
