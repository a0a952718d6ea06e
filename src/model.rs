use indexmap::IndexMap;
use serde::Serialize;

/// Sentinel written to both code columns when PubChem has nothing for a compound.
pub const NO_DATA: &str = "No data found";

/// Heading (or category) → strings, in document order.
pub type Sections = IndexMap<String, Vec<String>>;

/// Everything gathered for one CAS number. Serialized with PubChem-style keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompoundRecord {
    #[serde(rename = "CAS")]
    pub cas: String,
    #[serde(rename = "PubChemCID", skip_serializing_if = "Option::is_none")]
    pub cid: Option<u64>,
    #[serde(flatten)]
    pub details: Option<CompoundDetails>,
    #[serde(rename = "ToxData", skip_serializing_if = "Option::is_none")]
    pub tox_data: Option<Sections>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompoundDetails {
    #[serde(rename = "IUPAC")]
    pub iupac: String,
    #[serde(rename = "SMILES")]
    pub smiles: String,
    #[serde(rename = "Names")]
    pub names: Vec<String>,
    #[serde(rename = "Synonyms")]
    pub synonyms: Vec<String>,
    #[serde(rename = "LiteratureReferences")]
    pub literature_references: Sections,
}

impl CompoundRecord {
    /// Terminal record: nothing past `cid` was gathered.
    pub fn failed(cas: &str, cid: Option<u64>, error: impl Into<String>) -> Self {
        Self {
            cas: cas.to_string(),
            cid,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Comma-joined GHS hazard (H###) and precaution (P###) codes for one CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HazardCodeSet {
    pub hazards: String,
    pub precautions: String,
}

impl HazardCodeSet {
    pub fn no_data() -> Self {
        Self {
            hazards: NO_DATA.to_string(),
            precautions: NO_DATA.to_string(),
        }
    }
}
