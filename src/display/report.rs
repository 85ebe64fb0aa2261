//! Terminal rendering of an inspection report.
//!
//! ```text
//! [Decrypted JWE (B64 Mode)]
//! Header: {"alg":"dir","enc":"A256GCM"}
//! -------------------
//! Key Mode: Base64 (Length: 32 bytes)
//! Token Algorithm: dir
//! Token Encryption: A256GCM
//! -------------------
//! {
//!   "sub": "123"
//! }
//! ```

use colored::Colorize;
use serde_json::Value;

use super::json_printer::render_json;
use crate::core::key::KeyMode;
use crate::core::report::{InspectionMethod, InspectionResult};

const SEPARATOR: &str = "-------------------";

/// Render `result` as text. `key_mode` is the mode used for decryption,
/// shown in the label of a decrypted report.
pub fn render_report(result: &InspectionResult, key_mode: KeyMode, use_color: bool) -> String {
    let mut label = result.method.label().to_string();
    if result.method == InspectionMethod::JweDecryption && key_mode == KeyMode::Base64 {
        label.push_str(" (B64 Mode)");
    }
    let label = format!("[{label}]");

    let mut out = String::new();
    out.push_str(&paint(&label, use_color, |s| {
        if result.is_error {
            s.red().bold().to_string()
        } else {
            s.bold().to_string()
        }
    }));
    out.push('\n');

    if let Some(header) = &result.header_summary {
        out.push_str(&format!("Header: {header}\n{SEPARATOR}\n"));
    }
    if !result.debug_trail.is_empty() {
        for line in &result.debug_trail {
            out.push_str(&paint(line, use_color, |s| s.dimmed().to_string()));
            out.push('\n');
        }
        out.push_str(SEPARATOR);
        out.push('\n');
    }

    out.push_str(&render_content(result, use_color));
    out
}

fn render_content(result: &InspectionResult, use_color: bool) -> String {
    if result.is_error {
        return paint(&result.content, use_color, |s| s.red().to_string());
    }
    if use_color {
        if let Ok(value) = serde_json::from_str::<Value>(&result.content) {
            if value.is_object() || value.is_array() {
                return render_json(&value, true);
            }
        }
    }
    result.content.clone()
}

fn paint(text: &str, use_color: bool, style: impl Fn(&str) -> String) -> String {
    if use_color { style(text) } else { text.to_string() }
}

/// Render `result` as pretty JSON.
pub fn render_report_json(result: &InspectionResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
}
