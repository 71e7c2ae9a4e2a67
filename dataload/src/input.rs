use anyhow::{anyhow, Context, Result};
use log::info;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read an exported set dump from disk
pub fn load_rows(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to open {}", path.display()))?;
    info!("Read {} bytes from {}", content.len(), path.display());
    parse_rows(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Rows are either a bare JSON array or an object holding them under `sets`
pub fn parse_rows(content: &str) -> Result<Vec<Value>> {
    // Exports from spreadsheet tools sometimes carry a byte order mark
    let content = content.trim_start_matches('\u{feff}');
    let value: Value = serde_json::from_str(content).context("Invalid JSON")?;
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => match map.remove("sets") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(anyhow!("Invalid JSON structure: expected an array or an object with a \"sets\" array")),
        },
        _ => Err(anyhow!("Invalid JSON structure: must be an array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_array() {
        let rows = parse_rows(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_wrapped_array_with_bom() {
        let rows = parse_rows("\u{feff}{\"exportedAt\": \"2025-03-01\", \"sets\": [{\"id\": 1}]}").unwrap();
        assert_eq!(rows, vec![serde_json::json!({"id": 1})]);
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(parse_rows("42").is_err());
        assert!(parse_rows(r#"{"rows": []}"#).is_err());
        assert!(parse_rows("[{").is_err());
    }
}
