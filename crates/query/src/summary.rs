use extract::Triple;
use serde::Serialize;
use std::collections::HashSet;

const SAMPLE_SIZE: usize = 10;
const MAX_SUGGESTIONS: usize = 15;

const GENERAL_QUESTIONS: [&str; 10] = [
    "What are the hazards of this chemical?",
    "What are the first aid measures?",
    "How should this chemical be stored?",
    "What personal protective equipment is required?",
    "What are the physical properties?",
    "What are the fire fighting measures?",
    "How should spills be cleaned up?",
    "What are the disposal considerations?",
    "What regulatory information is available?",
    "What are the ingredients or components?",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub total_triples: usize,
    pub unique_subjects: usize,
    pub unique_predicates: usize,
    pub unique_objects: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub summary: String,
    pub stats: GraphStats,
    pub sample_predicates: Vec<String>,
    pub sample_subjects: Vec<String>,
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Describe a sample of a graph's triples.
pub fn summarize(graph_name: &str, triples: &[Triple]) -> GraphSummary {
    if triples.is_empty() {
        return GraphSummary {
            summary: format!("The graph '{graph_name}' appears to be empty."),
            stats: GraphStats::default(),
            sample_predicates: Vec::new(),
            sample_subjects: Vec::new(),
        };
    }

    let subjects = unique(triples.iter().map(|t| t.subject.as_str()));
    let predicates = unique(triples.iter().map(|t| t.predicate.as_str()));
    let objects = unique(triples.iter().map(|t| t.object.as_str()));

    let stats = GraphStats {
        total_triples: triples.len(),
        unique_subjects: subjects.len(),
        unique_predicates: predicates.len(),
        unique_objects: objects.len(),
    };

    let summary = format!(
        "The knowledge graph '{graph_name}' contains information about MSDS data with:\n\
         - {} triples\n\
         - {} unique subjects\n\
         - {} unique predicates\n\
         - {} unique objects\n\n\
         Common predicates include: {}\n\
         Main subjects include: {}",
        stats.total_triples,
        stats.unique_subjects,
        stats.unique_predicates,
        stats.unique_objects,
        predicates.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
        subjects.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
    );

    GraphSummary {
        summary,
        stats,
        sample_predicates: predicates.into_iter().take(SAMPLE_SIZE).collect(),
        sample_subjects: subjects.into_iter().take(SAMPLE_SIZE).collect(),
    }
}

/// General MSDS questions followed by ones drawn from the first five
/// predicates of a graph.
pub fn suggest_questions(predicates: &[String]) -> Vec<String> {
    let specific = predicates.iter().take(5).filter_map(|predicate| {
        let lower = predicate.to_lowercase();
        if lower.contains("hazard") {
            Some(format!("Tell me about {predicate}"))
        } else if lower.contains("property") {
            Some(format!("What {predicate} information is available?"))
        } else if lower.contains("measure") {
            Some(format!("What are the {predicate}?"))
        } else {
            None
        }
    });

    GENERAL_QUESTIONS
        .iter()
        .map(|q| q.to_string())
        .chain(specific)
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_unique_endpoints() {
        let triples = vec![
            Triple::new("WD-40", "is a", "Product").unwrap(),
            Triple::new("WD-40", "has", "Flash point").unwrap(),
            Triple::new("Naphtha", "is a", "Product").unwrap(),
        ];
        let summary = summarize("g", &triples);
        assert_eq!(
            summary.stats,
            GraphStats {
                total_triples: 3,
                unique_subjects: 2,
                unique_predicates: 2,
                unique_objects: 2,
            }
        );
        assert_eq!(summary.sample_predicates, vec!["is a", "has"]);
        assert!(summary.summary.contains("Main subjects include: WD-40, Naphtha"));
    }

    #[test]
    fn empty_graph_summary() {
        let summary = summarize("g", &[]);
        assert_eq!(summary.stats, GraphStats::default());
        assert_eq!(summary.summary, "The graph 'g' appears to be empty.");
    }

    #[test]
    fn predicate_driven_questions() {
        let predicates: Vec<String> = ["hazardCode", "is a", "physicalProperty", "firstAidMeasures"]
            .iter()
            .map(|p| p.to_string())
            .collect();
        let questions = suggest_questions(&predicates);
        assert_eq!(questions.len(), 13);
        assert_eq!(questions[10], "Tell me about hazardCode");
        assert_eq!(questions[11], "What physicalProperty information is available?");
        assert_eq!(questions[12], "What are the firstAidMeasures?");
    }

    #[test]
    fn suggestions_are_capped() {
        let predicates: Vec<String> = (0..8).map(|i| format!("hazard{i}")).collect();
        let questions = suggest_questions(&predicates);
        assert_eq!(questions.len(), MAX_SUGGESTIONS);
        assert_eq!(questions[14], "Tell me about hazard4");
    }
}
