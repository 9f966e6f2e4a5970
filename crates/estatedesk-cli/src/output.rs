//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a response body: pretty JSON when it parses, raw text otherwise.
pub fn body(bytes: &[u8]) -> Result<()> {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => json_pretty(&value),
        Err(_) => {
            println!("{}", String::from_utf8_lossy(bytes));
            Ok(())
        }
    }
}
