use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::LazyLock;

use crate::section::Section;

/// Header locators, one per section: "section N" followed by the leading
/// title word within the same line.
static HEADERS: LazyLock<Vec<Option<Regex>>> = LazyLock::new(|| {
    Section::ALL
        .iter()
        .map(|section| {
            let pattern = format!(
                r"section\s*{}\b[:.\-\s]*[^\n]{{0,60}}?{}\w*",
                section.number(),
                section.header_keyword()
            );
            RegexBuilder::new(&pattern).case_insensitive(true).build().ok()
        })
        .collect()
});

#[derive(Debug, Clone, Serialize)]
pub struct SectionText {
    pub section: Section,
    /// Byte offset of the header in the source text.
    pub offset: usize,
    pub body: String,
}

/// Split a document into the bodies of the sections whose headers are
/// present. A body runs from the end of its header to the start of the
/// next header in document order, or to the end of the text. Results are
/// ordered by section number.
pub fn segment_sections(text: &str) -> Vec<SectionText> {
    let mut headers: Vec<(Section, usize, usize)> = Section::ALL
        .iter()
        .filter_map(|&section| {
            let regex = HEADERS[section.index()].as_ref()?;
            let found = regex.find(text)?;
            Some((section, found.start(), found.end()))
        })
        .collect();

    headers.sort_by_key(|&(_, start, _)| start);

    let mut sections: Vec<SectionText> = headers
        .iter()
        .enumerate()
        .map(|(i, &(section, start, end))| {
            let stop = headers
                .get(i + 1)
                .map(|&(_, next_start, _)| next_start)
                .unwrap_or(text.len())
                .max(end);
            let body_start = title_end(text, end).min(stop);
            SectionText {
                section,
                offset: start,
                body: text[body_start..stop].trim().to_string(),
            }
        })
        .collect();

    sections.sort_by_key(|s| s.section);
    sections
}

/// Swallow the rest of a header line when it still looks like title text
/// (short, no `label:` pairs).
fn title_end(text: &str, end: usize) -> usize {
    let rest = &text[end..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    let tail = &rest[..line_len];
    if tail.len() <= 60 && !tail.contains(':') {
        end + line_len
    } else {
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
SECTION 1: PRODUCT AND COMPANY IDENTIFICATION
Product name: WD-40 Multi-Use Product
Company: WD-40 Company

SECTION 3: COMPOSITION/INFORMATION ON INGREDIENTS
LVP Aliphatic Hydrocarbon 64742-47-8 45-50%

SECTION 2: HAZARDS IDENTIFICATION
Signal word: Danger
";

    #[test]
    fn bodies_end_at_the_next_header_in_document_order() {
        let sections = segment_sections(SAMPLE);
        let numbers: Vec<u8> = sections.iter().map(|s| s.section.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        assert_eq!(
            sections[0].body,
            "Product name: WD-40 Multi-Use Product\nCompany: WD-40 Company"
        );
        assert_eq!(sections[1].body, "Signal word: Danger");
        assert!(sections[2].body.contains("64742-47-8"));
        assert!(!sections[2].body.contains("Signal word"));
    }

    #[test]
    fn section_one_does_not_match_section_ten() {
        let sections = segment_sections("Section 10: Stability and reactivity\nStable.");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section, Section::StabilityReactivity);
        assert_eq!(sections[0].body, "Stable.");
    }

    #[test]
    fn single_line_documents_keep_field_text() {
        let sections =
            segment_sections("Section 1: Identification Product name: X Section 2: Hazards Signal word: Danger");
        assert_eq!(sections[0].body, "Product name: X");
        assert_eq!(sections[1].body, "Signal word: Danger");
    }

    #[test]
    fn no_headers_yields_nothing() {
        assert!(segment_sections("just some text").is_empty());
    }
}
