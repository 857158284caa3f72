use extract::Triple;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Most results a chat search keeps after merging its passes.
pub const MAX_MERGED: usize = 20;

const STOP_WORDS: &[&str] = &[
    "what", "is", "are", "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
    "of", "with", "by", "about", "how", "when", "where", "why", "which", "who", "can", "could",
    "should", "would", "tell", "me", "show", "find", "get", "give", "list", "describe", "explain",
];

static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z0-9]+\b").ok());
static COMPOUND: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z0-9]+-[a-zA-Z0-9]+\b").ok());

/// Search terms for a question: lowercase words longer than two characters
/// that are not stop words, then hyphenated compounds such as `wd-40`.
/// Unique, in first-seen order.
pub fn extract_key_terms(query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut terms: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    let words = WORD
        .as_ref()
        .into_iter()
        .flat_map(|re| re.find_iter(&lower))
        .map(|m| m.as_str())
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w));
    let compounds = COMPOUND
        .as_ref()
        .into_iter()
        .flat_map(|re| re.find_iter(&lower))
        .map(|m| m.as_str());

    for term in words.chain(compounds) {
        if seen.insert(term) {
            terms.push(term.to_string());
        }
    }
    terms
}

/// Concatenate search passes, keeping the first occurrence of each triple,
/// up to [`MAX_MERGED`].
pub fn merge_unique<I>(passes: I) -> Vec<Triple>
where
    I: IntoIterator<Item = Vec<Triple>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for triple in passes.into_iter().flatten() {
        if merged.len() == MAX_MERGED {
            break;
        }
        if seen.insert(triple.clone()) {
            merged.push(triple);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(s, p, o).unwrap()
    }

    #[test]
    fn key_terms_drop_stop_words_and_keep_compounds() {
        assert_eq!(
            extract_key_terms("What is the flash point of WD-40?"),
            vec!["flash", "point", "wd-40"]
        );
        assert_eq!(extract_key_terms("Tell me about it"), Vec::<String>::new());
    }

    #[test]
    fn key_terms_are_unique() {
        assert_eq!(
            extract_key_terms("hazards hazards HAZARDS storage"),
            vec!["hazards", "storage"]
        );
    }

    #[test]
    fn duplicate_triples_across_passes_are_kept_once() {
        let merged = merge_unique(vec![
            vec![t("X", "Y", "Z"), t("A", "B", "C")],
            vec![t("X", "Y", "Z")],
        ]);
        assert_eq!(merged, vec![t("X", "Y", "Z"), t("A", "B", "C")]);
    }

    #[test]
    fn merge_is_capped() {
        let pass: Vec<Triple> = (0..30).map(|i| t(&format!("s{i}"), "has", "o")).collect();
        let merged = merge_unique(vec![pass]);
        assert_eq!(merged.len(), MAX_MERGED);
        assert_eq!(merged[0].subject, "s0");
    }

    #[test]
    fn all_patterns_compile() {
        assert!(WORD.is_some());
        assert!(COMPOUND.is_some());
    }
}
