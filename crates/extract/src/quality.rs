use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::schema::Triple;

/// Relationship phrases the extraction prompt allows in predicate position.
pub const PREDICATE_VOCABULARY: [&str; 11] = [
    "is a",
    "has",
    "includes",
    "is classified as",
    "is manufactured by",
    "is located at",
    "is regulated by",
    "is exposed to",
    "is protected by",
    "is described by",
    "is recommended for",
];

const TOP_PREDICATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateCount {
    pub predicate: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub unique_subjects: usize,
    pub unique_predicates: usize,
    pub unique_objects: usize,
    pub correct_format_percentage: f64,
    pub most_common_predicates: Vec<PredicateCount>,
}

/// Whether a predicate contains one of the controlled relationship phrases.
pub fn conforms(predicate: &str) -> bool {
    let lower = predicate.to_lowercase();
    PREDICATE_VOCABULARY.iter().any(|word| lower.contains(word))
}

/// Structural quality of a parsed triple set.
pub fn analyze(triples: &[Triple], raw_response: &str) -> QualityMetrics {
    if triples.is_empty() {
        return QualityMetrics::default();
    }

    let subjects: HashSet<&str> = triples.iter().map(|t| t.subject.as_str()).collect();
    let predicates: HashSet<&str> = triples.iter().map(|t| t.predicate.as_str()).collect();
    let objects: HashSet<&str> = triples.iter().map(|t| t.object.as_str()).collect();

    // counts kept in first-seen order so the stable sort breaks ties by it
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for triple in triples {
        match index.get(triple.predicate.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(triple.predicate.as_str(), order.len());
                order.push((triple.predicate.as_str(), 1));
            }
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let conforming = triples.iter().filter(|t| conforms(&t.predicate)).count();
    let percentage = conforming as f64 / triples.len() as f64 * 100.0;

    debug!(
        triples = triples.len(),
        response_lines = raw_response.lines().filter(|l| !l.trim().is_empty()).count(),
        conforming,
        "Analyzed extraction quality"
    );

    QualityMetrics {
        unique_subjects: subjects.len(),
        unique_predicates: predicates.len(),
        unique_objects: objects.len(),
        correct_format_percentage: round2(percentage),
        most_common_predicates: order
            .into_iter()
            .take(TOP_PREDICATES)
            .map(|(predicate, count)| PredicateCount {
                predicate: predicate.to_string(),
                count,
            })
            .collect(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(s, p, o).unwrap()
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(analyze(&[], "anything"), QualityMetrics::default());
    }

    #[test]
    fn half_conforming_predicates() {
        let metrics = analyze(&[t("A", "is a", "B"), t("A", "foo", "C")], "");
        assert_eq!(metrics.correct_format_percentage, 50.00);
    }

    #[test]
    fn percentage_rounds_to_two_places() {
        let triples = [t("A", "has", "B"), t("A", "x", "C"), t("A", "y", "D")];
        assert_eq!(analyze(&triples, "").correct_format_percentage, 33.33);
    }

    #[test]
    fn vocabulary_match_is_case_insensitive_substring() {
        assert!(conforms("Is Classified As"));
        assert!(conforms("hasIngredient"));
        assert!(!conforms("contains"));
    }

    #[test]
    fn unique_counts_for_wd40_sample() {
        let triples = [
            t("WD-40", "is a", "Product"),
            t("WD-40", "includes", "LVP Aliphatic Hydrocarbon"),
        ];
        let metrics = analyze(&triples, "");
        assert_eq!(metrics.unique_subjects, 1);
        assert_eq!(metrics.unique_predicates, 2);
        assert_eq!(metrics.unique_objects, 2);
    }

    #[test]
    fn top_predicates_tie_break_by_first_seen() {
        let triples = [
            t("A", "p1", "x"),
            t("A", "p2", "x"),
            t("B", "p2", "y"),
            t("A", "p3", "x"),
            t("A", "p4", "x"),
            t("A", "p5", "x"),
            t("A", "p6", "x"),
            t("C", "p1", "z"),
        ];
        let names: Vec<String> = analyze(&triples, "")
            .most_common_predicates
            .into_iter()
            .map(|p| p.predicate)
            .collect();
        assert_eq!(names, vec!["p1", "p2", "p3", "p4", "p5"]);
    }
}
