use anyhow::Result;
use fhevm_sdk::Encryptor;

use crate::commands::parse_input;
use crate::config::{load_config, Overrides};
use crate::output;
use crate::session::{explain, Session};

pub async fn run(overrides: &Overrides, value: &str) -> Result<()> {
    let byte = parse_input(value)?;
    let session = Session::open(load_config()?.apply(overrides))?;

    let sp = output::spinner("Initializing FHE instance...");
    session.ctx.settled().await;
    sp.finish_and_clear();

    if let Some(e) = session.ctx.error() {
        return Err(explain(&session.config, e));
    }

    let encryptor = Encryptor::new(session.ctx.clone());
    let encrypted = encryptor
        .encrypt(byte)
        .await
        .map_err(|e| explain(&session.config, e))?;

    if output::is_json() {
        output::json_output(serde_json::json!({
            "value": byte,
            "data": encrypted.to_hex(),
            "signature": encrypted.signature,
        }));
    } else {
        output::success("value encrypted");
        output::label("value", &byte.to_string());
        output::label("ciphertext", &format!("0x{}", hex::encode(&encrypted.data)));
        output::label("bytes", &encrypted.data.len().to_string());
    }
    Ok(())
}
