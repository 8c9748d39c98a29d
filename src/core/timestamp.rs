use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};

pub fn utc_ns_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() * 1_000_000_000 + d.subsec_nanos() as u64)
        .unwrap_or(0)
}

/// File-system safe clip identifier, e.g. `motion_2024-05-01T13-37-00.123+02-00_0007`.
///
/// `serial` keeps ids distinct when two clips finish within the same millisecond.
pub fn clip_id(ts: &DateTime<Local>, serial: u64) -> String {
    let stamp = ts.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string();
    format!("motion_{}_{:04}", stamp.replace(':', "-"), serial)
}
