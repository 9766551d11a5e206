//! The `lunr-store.js` artifact: a script assigning the record array to `store`.

use std::path::Path;

use crate::article::PostRecord;
use crate::error::{Error, Result};

const ASSIGNMENT: &str = "var store = ";

pub fn render(records: &[PostRecord]) -> Result<String> {
    let json = serde_json::to_string_pretty(records)?;
    Ok(format!("{ASSIGNMENT}{json}\n"))
}

/// Reads the record array back out of a store script and validates every
/// record.
pub fn parse(script: &str) -> Result<Vec<PostRecord>> {
    let script = script.trim();
    let body = ["var", "let", "const"]
        .iter()
        .find_map(|keyword| script.strip_prefix(keyword))
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix("store"))
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or_else(|| Error::Store("expected `var store = [...]`".to_string()))?;
    let body = body.trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    let items: Vec<serde_json::Value> = serde_json::from_str(body)?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let record: PostRecord =
                serde_json::from_value(item).map_err(|e| Error::InvalidRecord {
                    index,
                    reason: e.to_string(),
                })?;
            record.validate().map_err(|e| Error::InvalidRecord {
                index,
                reason: e.to_string(),
            })?;
            Ok(record)
        })
        .collect()
}

pub fn read(path: &Path) -> Result<Vec<PostRecord>> {
    let script = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse(&script)
}

pub fn write(path: &Path, records: &[PostRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, render(records)?).map_err(|e| Error::io(path, e))
}
