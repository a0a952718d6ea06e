use serde_json::Value;

use super::{heading, information, markup_strings, record_sections};
use crate::model::Sections;

pub const REFERENCE_CATEGORIES: [&str; 4] = [
    "Disease and References",
    "Nature Journal References",
    "Springer Nature References",
    "Other Safety Information",
];

/// Top-level literature sections, grouped by category. All categories are present even when empty.
pub fn extract_references(doc: &Value) -> Sections {
    let mut refs: Sections = REFERENCE_CATEGORIES
        .iter()
        .map(|c| (c.to_string(), Vec::new()))
        .collect();

    for section in record_sections(doc) {
        if let Some(list) = heading(section).and_then(|h| refs.get_mut(h)) {
            list.extend(
                information(section)
                    .iter()
                    .flat_map(markup_strings)
                    .map(str::to_string),
            );
        }
    }
    refs
}
