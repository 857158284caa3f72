use crate::parser::TRIPLE_DELIMITER;
use crate::quality::PREDICATE_VOCABULARY;

/// Prefix put in front of the document text handed to the generator.
pub const DOCUMENT_PREFIX: &str = "This is a MSDS specification: ";

const NODE_TYPES: &str =
    "Chemical, Hazard, Manufacturer, ExposureLimit, PhysicalProperty, ProtectiveMeasure, Regulation, Location, Contact";

/// Triple extraction instruction. The ontology-aware variant additionally
/// restricts extraction to a list of allowed attributes.
#[derive(Debug, Clone, Default)]
pub struct TriplePrompt {
    allowed_attributes: Option<Vec<String>>,
}

impl TriplePrompt {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn ontology_aware(allowed_attributes: Vec<String>) -> Self {
        Self {
            allowed_attributes: Some(allowed_attributes),
        }
    }

    pub fn allowed_attributes(&self) -> Option<&[String]> {
        self.allowed_attributes.as_deref()
    }

    pub fn render(&self, document_text: &str) -> String {
        let d = TRIPLE_DELIMITER;
        let predicates: String = PREDICATE_VOCABULARY
            .iter()
            .map(|p| format!("- {p}\n"))
            .collect();

        let (title, node_types, filtering, reminder) = match &self.allowed_attributes {
            Some(attrs) => {
                let list = attrs.join(", ");
                (
                    " (Ontology-Aware)",
                    format!("Product, {NODE_TYPES}"),
                    format!(
                        r#"
## Attribute Filtering (Data Properties)
- Extract ONLY information that matches or closely matches the allowed attributes below:
  {list}
- Matching is case insensitive and partial matches are allowed.
- Ignore all other attributes or properties.
"#
                    ),
                    format!("\nOnly extract information matching the allowed attributes: {list}"),
                )
            }
            None => ("", NODE_TYPES.to_string(), String::new(), String::new()),
        };

        format!(
            r#"## CRITICAL INSTRUCTION: Extract Knowledge Graph Triples in EXACT Subject-Predicate-Object Order{title}

You MUST extract triples in this EXACT format: (Subject, Predicate, Object)

## WRONG FORMAT EXAMPLES (DO NOT DO THIS):
- (WD-40, Product, is a)
- (WD-40, LVP Aliphatic Hydrocarbon, includes)
- (LVP Aliphatic Hydrocarbon, CAS# 64742-47-8, has)

## CORRECT FORMAT EXAMPLES (DO THIS):
- (WD-40, is a, Product)
- (WD-40, includes, LVP Aliphatic Hydrocarbon)
- (LVP Aliphatic Hydrocarbon, has, CAS# 64742-47-8)

## MANDATORY RULES:
1. Subject: always the main entity being described
2. Predicate: always the relationship phrase (is a, has, includes, is manufactured by, etc.)
3. Object: always the target entity or value
4. Never put a comma inside a field
5. End every triple with {d}

## Allowed Predicates (MIDDLE position only):
{predicates}{filtering}
## Node Types for Objects:
{node_types}

## EXAMPLE:
Text: "WD-40 contains LVP Aliphatic Hydrocarbon (CAS# 64742-47-8) with 45-50% weight. It is classified as Aspiration Toxicity Category 1."

Output:
(WD-40, is a, Product){d}
(WD-40, includes, LVP Aliphatic Hydrocarbon){d}
(LVP Aliphatic Hydrocarbon, has, CAS# 64742-47-8){d}
(LVP Aliphatic Hydrocarbon, has, 45-50% weight){d}
(LVP Aliphatic Hydrocarbon, is classified as, Aspiration Toxicity Category 1){d}

## Your Task:
Extract triples from the following MSDS text. Subject-Predicate-Object order is MANDATORY.{reminder}

Text: {DOCUMENT_PREFIX}{document_text}

Output:
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TripleParser;

    #[test]
    fn embeds_document_and_vocabulary() {
        let prompt = TriplePrompt::standard().render("Section 1: Identification");
        assert!(prompt.contains("Text: This is a MSDS specification: Section 1: Identification"));
        for predicate in PREDICATE_VOCABULARY {
            assert!(prompt.contains(&format!("- {predicate}\n")));
        }
        assert!(!prompt.contains("Attribute Filtering"));
    }

    #[test]
    fn ontology_aware_lists_attributes() {
        let prompt = TriplePrompt::ontology_aware(vec!["casNumber".into(), "flashPoint".into()])
            .render("text");
        assert!(prompt.contains("casNumber, flashPoint"));
        assert!(prompt.contains("Product, Chemical"));
    }

    #[test]
    fn worked_example_parses_with_the_default_parser() {
        let prompt = TriplePrompt::standard().render("");
        let example = prompt
            .split("Output:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap();
        assert_eq!(TripleParser::default().parse(example).len(), 5);
    }
}
