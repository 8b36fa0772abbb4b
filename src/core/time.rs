//! Shared timestamp helpers for backup names and CLI envelopes.

use chrono::Local;
use serde_json::Value as JsonValue;

/// Returns unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

/// Local wall-clock timestamp in the backup-file form
/// `yyyy-MM-dd-HH-mm-ss-fffffff` (seven sub-second digits, 100ns units).
pub fn backup_timestamp() -> String {
    let now = Local::now();
    let fraction = now.timestamp_subsec_nanos() / 100;
    format!("{}-{:07}", now.format("%Y-%m-%d-%H-%M-%S"), fraction)
}

/// Standard command response envelope shape used by the CLI's json output.
pub fn command_envelope(cmd: &str, status: &str, extra: JsonValue) -> JsonValue {
    let mut base = serde_json::json!({
        "ts": now_epoch_z(),
        "cmd": cmd,
        "status": status
    });
    if let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
    base
}
