use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::model::{HazardCodeSet, NO_DATA};

static HAZARD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"H\d{3}").unwrap());
static PRECAUTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"P\d{3}").unwrap());

/// Pull GHS hazard (H###) and precaution (P###) codes out of a classification body.
/// "No data found" anywhere in the body wins over any codes.
pub fn extract_codes(body: &str) -> HazardCodeSet {
    if body.contains(NO_DATA) {
        return HazardCodeSet::no_data();
    }
    HazardCodeSet {
        hazards: join_codes(&HAZARD_RE, body),
        precautions: join_codes(&PRECAUTION_RE, body),
    }
}

fn join_codes(re: &Regex, body: &str) -> String {
    re.find_iter(body)
        .map(|m| m.as_str())
        .sorted()
        .dedup()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicated_codes_sorted_and_deduped() {
        let body = "H302 H315 H319 P264 P270 H302 H315 H319 P264 P270";
        let codes = extract_codes(body);
        assert_eq!(codes.hazards, "H302,H315,H319");
        assert_eq!(codes.precautions, "P264,P270");
    }

    #[test]
    fn no_data_short_circuits() {
        assert_eq!(extract_codes("No data found"), HazardCodeSet::no_data());
        assert_eq!(
            extract_codes(r#"{"Fault": "H302 No data found P264"}"#),
            HazardCodeSet::no_data()
        );
    }

    #[test]
    fn codes_inside_json_strings() {
        let body = r#"{"String":"H319 (100%): Causes serious eye irritation"},
                      {"String":"P305+P351+P338, P280, P264"},
                      {"String":"H302 (85.4%): Harmful if swallowed"}"#;
        let codes = extract_codes(body);
        assert_eq!(codes.hazards, "H302,H319");
        assert_eq!(codes.precautions, "P264,P280,P305,P338,P351");
    }

    #[test]
    fn empty_body() {
        assert_eq!(extract_codes(""), HazardCodeSet::default());
    }

    #[test]
    fn every_code_is_well_formed() {
        let body = "H3019 P12 H30 p264 HH400 P2100 h301 PH999";
        let codes = extract_codes(body);
        let well_formed = |code: &str, prefix: char| {
            code.len() == 4
                && code.starts_with(prefix)
                && code[1..].chars().all(|c| c.is_ascii_digit())
        };
        for c in codes.hazards.split(',').filter(|c| !c.is_empty()) {
            assert!(well_formed(c, 'H'), "{}", c);
        }
        for c in codes.precautions.split(',').filter(|c| !c.is_empty()) {
            assert!(well_formed(c, 'P'), "{}", c);
        }
        assert_eq!(codes.hazards, "H301,H400,H999");
        assert_eq!(codes.precautions, "P210");
    }
}
