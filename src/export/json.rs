use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::CompoundRecord;

/// Write all records as a pretty-printed JSON array.
pub fn save(records: &[CompoundRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_array_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tox_data.json");
        let records = vec![
            CompoundRecord::failed("7732-18-5", Some(962), "HTTP error 500"),
            CompoundRecord::failed("0000-00-0", None, "Could not find PubChem CID"),
        ];
        save(&records, &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {"));
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["CAS"], "7732-18-5");
        assert_eq!(parsed[0]["PubChemCID"], 962);
        assert_eq!(parsed[1]["error"], "Could not find PubChem CID");
        assert!(parsed[1].get("PubChemCID").is_none());
    }

    #[test]
    fn unwritable_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("tox_data.json");
        assert!(save(&[], &path).is_err());
    }
}
