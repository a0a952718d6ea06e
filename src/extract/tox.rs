use serde_json::Value;

use super::{child_sections, heading, record_sections, section_strings};
use crate::model::Sections;

const TOX_KEYWORDS: &[&str] = &[
    "tox",
    "safety",
    "hazard",
    "health",
    "exposure",
    "risk",
    "carcinogen",
];

/// Collect every section whose heading mentions a toxicology keyword, at any depth.
///
/// Matching is per node: children are always visited, whether or not the parent matched.
/// Headings are the result keys, so a heading seen twice keeps only the later section's
/// strings (in the position of the first occurrence).
pub fn extract_tox_data(doc: &Value) -> Sections {
    record_sections(doc)
        .iter()
        .fold(Sections::new(), |acc, section| visit(section, acc))
}

fn visit(section: &Value, mut acc: Sections) -> Sections {
    if let Some(title) = heading(section).filter(|h| is_tox_heading(h)) {
        acc.insert(title.to_string(), section_strings(section));
    }
    child_sections(section)
        .iter()
        .fold(acc, |acc, child| visit(child, acc))
}

pub fn is_tox_heading(heading: &str) -> bool {
    let lower = heading.to_lowercase();
    TOX_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture;
    use serde_json::json;

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(is_tox_heading("Toxicity"));
        assert!(is_tox_heading("SAFETY AND HAZARDS"));
        assert!(is_tox_heading("Occupational Exposure Limits"));
        assert!(is_tox_heading("Carcinogen Classification"));
        assert!(is_tox_heading("Health Effects"));
        assert!(is_tox_heading("Risk Phrases"));
        assert!(!is_tox_heading("Names and Identifiers"));
        assert!(!is_tox_heading("Pharmacology and Biochemistry"));
    }

    #[test]
    fn aspirin_sections() {
        let doc = fixture("aspirin_record");
        let tox = extract_tox_data(&doc);
        let headings: Vec<&str> = tox.keys().map(String::as_str).collect();
        assert_eq!(
            headings,
            vec![
                "Drug Toxicity",
                "Safety and Hazards",
                "Hazards Identification",
                "GHS Classification",
                "Exposure Routes",
                "Toxicity",
                "Toxicological Information",
                "Acute Toxicity",
                "Other Safety Information",
            ]
        );
        assert_eq!(
            tox["GHS Classification"],
            vec!["H302: Harmful if swallowed", "P264", "P270"]
        );
        // Parent headings with no Information of their own still appear
        assert!(tox["Safety and Hazards"].is_empty());
    }

    #[test]
    fn match_under_unmatched_parent() {
        let doc = fixture("aspirin_record");
        let tox = extract_tox_data(&doc);
        assert!(!tox.contains_key("Pharmacology and Biochemistry"));
        assert_eq!(tox["Drug Toxicity"], vec!["Reye syndrome in children"]);
    }

    #[test]
    fn duplicate_heading_last_wins() {
        let doc = fixture("aspirin_record");
        let tox = extract_tox_data(&doc);
        assert_eq!(tox["Exposure Routes"], vec!["Oral, inhalation (second)"]);
        let first = tox.get_index_of("Exposure Routes").unwrap();
        assert!(first < tox.get_index_of("Toxicity").unwrap());
    }

    #[test]
    fn idempotent() {
        let doc = fixture("aspirin_record");
        let a = serde_json::to_string(&extract_tox_data(&doc)).unwrap();
        let b = serde_json::to_string(&extract_tox_data(&doc)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn no_record_means_empty() {
        assert!(extract_tox_data(&json!({"Fault": {"Code": "PUGVIEW.NotFound"}})).is_empty());
        assert!(extract_tox_data(&json!({"Record": {"RecordType": "CID"}})).is_empty());
    }

    #[test]
    fn deep_nesting() {
        let doc = json!({"Record": {"Section": [
            {"TOCHeading": "A", "Section": [
                {"TOCHeading": "B", "Section": [
                    {"TOCHeading": "C", "Section": [
                        {"TOCHeading": "Hazard Classes",
                         "Information": [{"Value": {"StringWithMarkup": [{"String": "Flam. Liq. 2"}]}}]}
                    ]}
                ]}
            ]}
        ]}});
        let tox = extract_tox_data(&doc);
        assert_eq!(tox.len(), 1);
        assert_eq!(tox["Hazard Classes"], vec!["Flam. Liq. 2"]);
    }
}
