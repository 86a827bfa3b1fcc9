//! Terminal rendering for the `fhevm` binary.
//!
//! Human-readable text goes to stderr so that `--json` documents and the
//! `watch` event stream on stdout stay machine-parseable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Map, Value};

static JSON: AtomicBool = AtomicBool::new(false);

const SPINNER_FRAMES: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

pub fn set_json_mode(enabled: bool) {
    JSON.store(enabled, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

fn human(line: impl std::fmt::Display) {
    if !is_json() {
        eprintln!("{line}");
    }
}

pub fn success(msg: &str) {
    human(msg.green());
}

pub fn warn(msg: &str) {
    human(msg.yellow());
}

pub fn info(msg: &str) {
    human(msg);
}

/// `key: value` with the key in bold.
pub fn label(key: &str, val: &str) {
    human(format_args!("{} {val}", format!("{key}:").bold()));
}

pub fn yes_no(flag: bool) -> String {
    let word: ColoredString = if flag { "Yes".green() } else { "No".yellow() };
    word.to_string()
}

/// One-shot command result, printed whole on stdout.
pub fn json_output(value: Value) {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    println!("{text}");
}

/// Builds a stream record: `{"event": kind}` merged with the object `fields`.
/// Non-object `fields` are carried under `"data"`.
pub fn event_record(kind: &str, fields: Value) -> Value {
    let mut record = Map::new();
    record.insert("event".into(), json!(kind));
    match fields {
        Value::Object(extra) => {
            for (k, v) in extra {
                if k != "event" {
                    record.insert(k, v);
                }
            }
        }
        Value::Null => {}
        other => {
            record.insert("data".into(), other);
        }
    }
    Value::Object(record)
}

/// Streaming output used by `watch`: one compact JSON line per event in
/// `--json` mode, otherwise `text` on stderr.
pub fn event(kind: &str, fields: Value, text: impl AsRef<str>) {
    if is_json() {
        println!("{}", event_record(kind, fields));
    } else {
        human(format_args!("{} {}", format!("[{kind}]").cyan(), text.as_ref()));
    }
}

/// Spinner for RPC round trips; hidden in `--json` mode.
pub fn spinner(msg: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars(SPINNER_FRAMES)
        .template("{spinner:.cyan} {msg}")
    {
        bar.set_style(style);
    }
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn fail_with_hint(error: &str, hint: &str) -> anyhow::Error {
    anyhow::anyhow!("{}\n{} {hint}", error.red(), "hint:".bold())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_words() {
        colored::control::set_override(false);
        assert_eq!(yes_no(true), "Yes");
        assert_eq!(yes_no(false), "No");
    }

    #[test]
    fn event_record_merges_object_fields() {
        let record = event_record("job_submitted", json!({ "job_id": "3", "algorithm": 1 }));
        assert_eq!(
            record,
            json!({ "event": "job_submitted", "job_id": "3", "algorithm": 1 })
        );
    }

    #[test]
    fn event_record_keeps_kind_and_wraps_scalars() {
        assert_eq!(
            event_record("chain_changed", json!({ "event": "spoofed", "chain_id": 1 })),
            json!({ "event": "chain_changed", "chain_id": 1 })
        );
        assert_eq!(event_record("disconnected", Value::Null), json!({ "event": "disconnected" }));
        assert_eq!(
            event_record("tick", json!(5)),
            json!({ "event": "tick", "data": 5 })
        );
    }
}
