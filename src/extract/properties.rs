use serde_json::Value;

const NOT_AVAILABLE: &str = "N/A";
// PubChem now answers a CanonicalSMILES request with ConnectivitySMILES
const SMILES_KEYS: &[&str] = &["CanonicalSMILES", "SMILES", "ConnectivitySMILES"];

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySummary {
    pub iupac: String,
    pub smiles: String,
}

impl Default for PropertySummary {
    fn default() -> Self {
        Self {
            iupac: NOT_AVAILABLE.to_string(),
            smiles: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Read IUPAC name and SMILES from `PropertyTable.Properties[0]`.
pub fn extract_properties(doc: &Value) -> PropertySummary {
    let Some(props) = doc.pointer("/PropertyTable/Properties/0") else {
        return PropertySummary::default();
    };
    let text = |key: &str| props.get(key).and_then(Value::as_str).map(str::to_string);

    PropertySummary {
        iupac: text("IUPACName").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        smiles: SMILES_KEYS
            .iter()
            .find_map(|k| text(*k))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}
