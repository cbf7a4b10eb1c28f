pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Structured input from `--input <file>` or piped stdin, in that order.
/// Returns None when neither is present so the caller can fall back to flags.
pub fn read_structured<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    // An interactive terminal means no piped document
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// Blank input counts as absent; anything else must be a JSON document.
fn parse_piped<T: DeserializeOwned>(buffer: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let body = buffer.trim();
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| format!("Failed to parse JSON from stdin: {e}").into())
}
