pub mod csv;
pub mod table;

use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Signed gap with an explicit plus for understaffed tiers.
pub fn format_gap(delta: i64) -> String {
    if delta == 0 {
        "0".to_string()
    } else {
        format!("{delta:+}")
    }
}
