use anyhow::Result;
use fhevm_sdk::WalletChange;

use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::{explain_quantum, Session};

pub async fn run(overrides: &Overrides) -> Result<()> {
    let session = Session::open(load_config()?.apply(overrides))?;
    session.connect().await?;
    let fail = |e| explain_quantum(&session.config, e);

    let submitted = session
        .contract
        .on_job_submitted(|e| {
            output::event(
                "job_submitted",
                serde_json::json!({
                    "job_id": e.jobId.to_string(),
                    "submitter": e.submitter,
                    "algorithm": e.algorithmType,
                }),
                format!("submitted  job {} by {} (algorithm {})", e.jobId, e.submitter, e.algorithmType),
            )
        })
        .await
        .map_err(fail)?;
    let completed = session
        .contract
        .on_job_completed(|e| {
            output::event(
                "job_completed",
                serde_json::json!({ "job_id": e.jobId.to_string(), "submitter": e.submitter }),
                format!("completed  job {} by {}", e.jobId, e.submitter),
            )
        })
        .await
        .map_err(fail)?;

    let watcher = session
        .provider
        .clone()
        .spawn_watcher(session.config.poll_interval());
    let wallet = session.ctx.wallet_manager();
    let mut events = wallet.provider_events();

    output::success(&format!(
        "watching {} (ctrl-c to stop)",
        session.config.contract_address
    ));

    loop {
        let change = async {
            match events.as_mut() {
                Some(rx) => wallet.next_change(rx).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = change => match change {
                Some(WalletChange::Disconnected) => {
                    output::event("disconnected", serde_json::Value::Null, "wallet disconnected");
                    break;
                }
                Some(WalletChange::ReconnectRequested { .. }) => {
                    let state = session.connect().await?;
                    output::event(
                        "accounts_changed",
                        serde_json::json!({ "account": state.address }),
                        format!(
                            "account changed to {}",
                            state.address.map(|a| a.to_string()).unwrap_or_default()
                        ),
                    );
                }
                Some(WalletChange::ReloadRequired { chain_id }) => {
                    output::event(
                        "chain_changed",
                        serde_json::json!({ "chain_id": chain_id }),
                        format!("chain changed to {chain_id}; restart to reload"),
                    );
                    break;
                }
                None => break,
            },
        }
    }

    submitted.unsubscribe();
    completed.unsubscribe();
    watcher.abort();
    Ok(())
}
