pub mod config;
pub mod connect;
pub mod decrypt;
pub mod encrypt;
pub mod init_state;
pub mod job;
pub mod status;
pub mod submit;
pub mod watch;

use alloy_primitives::U256;
use anyhow::Result;
use fhevm_sdk::encryption::PlainValue;

use crate::output;

/// Job / request ids: decimal or 0x-hex.
pub fn parse_id(s: &str) -> Result<U256> {
    s.trim().parse::<U256>().map_err(|_| {
        output::fail_with_hint(&format!("invalid id: {s}"), "use a decimal or 0x-prefixed number")
    })
}

/// Range-checked 8-bit input.
pub fn parse_input(s: &str) -> Result<u8> {
    PlainValue::from(s)
        .to_u8()
        .map_err(|e| output::fail_with_hint(&e.to_string(), "use an integer from 0 to 255"))
}
