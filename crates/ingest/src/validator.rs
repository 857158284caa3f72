use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::section::{SECTION_COUNT, Section};

/// Compiled detection patterns, indexed by `Section::index`.
static SECTION_PATTERNS: LazyLock<Vec<Vec<Regex>>> = LazyLock::new(|| {
    Section::ALL
        .iter()
        .map(|section| {
            section
                .patterns()
                .iter()
                .filter_map(|pattern| {
                    RegexBuilder::new(pattern)
                        .case_insensitive(true)
                        .build()
                        .ok()
                })
                .collect()
        })
        .collect()
});

#[derive(Debug, Clone, Serialize)]
pub struct SectionDetail {
    pub section: Section,
    pub found: bool,
    /// Pattern that detected the section, if any.
    pub matched_pattern: Option<&'static str>,
    pub patterns_tried: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub score: f64,
    pub found: Vec<Section>,
    pub missing: Vec<Section>,
    pub details: Vec<SectionDetail>,
}

impl ValidationResult {
    /// Result for input that could not be read as text at all.
    pub fn unreadable() -> Self {
        Self {
            is_valid: false,
            score: 0.0,
            found: Vec::new(),
            missing: Section::ALL.to_vec(),
            details: Section::ALL
                .iter()
                .map(|&section| SectionDetail {
                    section,
                    found: false,
                    matched_pattern: None,
                    patterns_tried: 0,
                })
                .collect(),
        }
    }

    pub fn sections_found_count(&self) -> usize {
        self.found.len()
    }

    pub fn total_sections_required(&self) -> usize {
        SECTION_COUNT
    }
}

/// Check a document for the sixteen required sections.
///
/// Patterns run against a single whitespace-flattened copy of the text,
/// so headers broken across lines are still detected. The first matching
/// pattern of a section decides; the rest are not tried.
pub fn validate(text: &str) -> ValidationResult {
    let flattened = flatten(text);
    let mut found = Vec::new();
    let mut missing = Vec::new();
    let mut details = Vec::with_capacity(SECTION_COUNT);

    for section in Section::ALL {
        let compiled = &SECTION_PATTERNS[section.index()];
        let mut tried = 0;
        let mut matched = None;

        for (pattern, regex) in section.patterns().iter().zip(compiled) {
            tried += 1;
            if regex.is_match(&flattened) {
                matched = Some(*pattern);
                break;
            }
        }

        if matched.is_some() {
            found.push(section);
        } else {
            missing.push(section);
        }
        details.push(SectionDetail {
            section,
            found: matched.is_some(),
            matched_pattern: matched,
            patterns_tried: tried,
        });
    }

    let score = found.len() as f64 * 100.0 / SECTION_COUNT as f64;
    debug!(found = found.len(), missing = missing.len(), score, "Validated document sections");

    ValidationResult {
        is_valid: missing.is_empty(),
        score,
        found,
        missing,
        details,
    }
}

/// Validate raw bytes; anything that is not UTF-8 text reports every
/// section missing.
pub fn validate_bytes(bytes: &[u8]) -> ValidationResult {
    match std::str::from_utf8(bytes) {
        Ok(text) => validate(text),
        Err(_) => ValidationResult::unreadable(),
    }
}

fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(sections: &[Section]) -> String {
        sections
            .iter()
            .map(|s| format!("Section {}: {}\nSome body text.\n", s.number(), s.name()))
            .collect()
    }

    #[test]
    fn every_pattern_compiles() {
        for section in Section::ALL {
            assert_eq!(
                SECTION_PATTERNS[section.index()].len(),
                section.patterns().len(),
                "pattern failed to compile for {section}"
            );
        }
    }

    #[test]
    fn all_sixteen_headers_make_a_valid_document() {
        let result = validate(&headers(&Section::ALL));
        assert!(result.is_valid);
        assert_eq!(result.score, 100.0);
        assert!(result.missing.is_empty());
        assert_eq!(result.sections_found_count(), 16);
    }

    #[test]
    fn first_three_sections_score_partial() {
        let result = validate(&headers(&Section::ALL[..3]));
        assert!(!result.is_valid);
        assert_eq!(result.score, 18.75);
        let missing: Vec<u8> = result.missing.iter().map(|s| s.number()).collect();
        assert_eq!(missing, (4..=16).collect::<Vec<u8>>());
    }

    #[test]
    fn each_header_is_detected_on_its_own() {
        for section in Section::ALL {
            let text = format!("Preamble.\nSECTION {} - {}\nbody", section.number(), section.name());
            let result = validate(&text);
            assert!(result.found.contains(&section), "{section} not detected");
        }
    }

    #[test]
    fn header_split_across_lines_is_detected() {
        let result = validate("Section\n  4 :\n First\n   Aid Measures\n");
        assert!(result.found.contains(&Section::FirstAid));
    }

    #[test]
    fn first_matching_pattern_stops_the_search() {
        let result = validate("Section 1: Identification");
        let detail = &result.details[0];
        assert!(detail.found);
        assert_eq!(detail.patterns_tried, 1);

        let result = validate("1. Identification");
        assert_eq!(result.details[0].patterns_tried, 4);
    }

    #[test]
    fn empty_text_has_no_sections() {
        let result = validate("");
        assert!(!result.is_valid);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.missing.len(), 16);
    }

    #[test]
    fn non_utf8_bytes_report_everything_missing() {
        let result = validate_bytes(&[0xff, 0xfe, 0x00, 0x81]);
        assert!(!result.is_valid);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.missing, Section::ALL.to_vec());
    }
}
