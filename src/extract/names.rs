use serde_json::Value;

use super::{child_sections, heading, info_name, information, markup_strings, record_sections};

const NAMES_SECTION: &str = "Names and Identifiers";
const DESCRIPTORS_SECTION: &str = "Computed Descriptors";
const SYNONYMS_SECTION: &str = "Synonyms";
const IUPAC_ENTRY: &str = "IUPAC Name";
const SYNONYM_ENTRY: &str = "Synonym";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamesAndSynonyms {
    pub names: Vec<String>,
    pub synonyms: Vec<String>,
}

/// Walk "Names and Identifiers" → {"Computed Descriptors", "Synonyms"}.
/// Only the first "Names and Identifiers" section is read.
pub fn extract_names(doc: &Value) -> NamesAndSynonyms {
    let mut out = NamesAndSynonyms::default();
    let Some(section) = record_sections(doc)
        .iter()
        .find(|s| heading(s) == Some(NAMES_SECTION))
    else {
        return out;
    };

    for sub in child_sections(section) {
        match heading(sub) {
            Some(DESCRIPTORS_SECTION) => out.names.extend(
                entries_named(sub, IUPAC_ENTRY)
                    .filter_map(|info| markup_strings(info).next())
                    .map(str::to_string),
            ),
            Some(SYNONYMS_SECTION) => out.synonyms.extend(
                entries_named(sub, SYNONYM_ENTRY)
                    .flat_map(markup_strings)
                    .map(str::to_string),
            ),
            _ => {}
        }
    }
    out
}

fn entries_named<'a>(section: &'a Value, name: &'a str) -> impl Iterator<Item = &'a Value> {
    information(section)
        .iter()
        .filter(move |info| info_name(info) == Some(name))
}
