//! Best-effort recovery of triples from free-form generator output.
//!
//! Each line is offered to an ordered list of pure strategies and the
//! first one that yields a triple wins. Lines no strategy accepts are
//! skipped silently.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::schema::{Triple, normalize_field};

/// Delimiter the extraction prompt asks the generator to end each triple with.
pub const TRIPLE_DELIMITER: &str = "<|>";

/// Literal placeholder some generators echo back instead of the delimiter.
pub const DELIMITER_PLACEHOLDER: &str = "{KG_TRIPLE_DELIMITER}";

static LABELED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    RegexBuilder::new(
        r"subject:\s*([^,]+?)\s*,\s*predicate:\s*([^,]+?)\s*,\s*object:\s*(.+)",
    )
    .case_insensitive(true)
    .build()
    .ok()
});

/// A single line-level extraction strategy.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub apply: fn(&str, &[String]) -> Option<Triple>,
}

/// Strategies in priority order.
pub const STRATEGIES: [Strategy; 4] = [
    Strategy {
        name: "parenthesized",
        apply: parenthesized_strategy,
    },
    Strategy {
        name: "labeled",
        apply: labeled_strategy,
    },
    Strategy {
        name: "delimited",
        apply: delimiter_terminated,
    },
    Strategy {
        name: "loose",
        apply: loose_strategy,
    },
];

fn parenthesized_strategy(line: &str, _: &[String]) -> Option<Triple> {
    parenthesized_csv(line)
}

fn labeled_strategy(line: &str, _: &[String]) -> Option<Triple> {
    labeled_fields(line)
}

fn loose_strategy(line: &str, _: &[String]) -> Option<Triple> {
    loose_brackets(line)
}

/// `(A, B, C)` with exactly three comma-separated fields.
pub fn parenthesized_csv(line: &str) -> Option<Triple> {
    let inner = line.strip_prefix('(')?.strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').collect();
    match parts.as_slice() {
        [s, p, o] => Triple::new(s, p, o),
        _ => None,
    }
}

/// `Subject: A, Predicate: B, Object: C`, labels matched case-insensitively.
/// Subject and predicate run to the next comma; the object takes the rest
/// of the line.
pub fn labeled_fields(line: &str) -> Option<Triple> {
    let lower = line.to_lowercase();
    if !(lower.contains("subject:") && lower.contains("predicate:") && lower.contains("object:")) {
        return None;
    }
    let caps = LABELED.as_ref()?.captures(line)?;
    Triple::new(&caps[1], &caps[2], &caps[3])
}

/// `(A, B, C)<delimiter>trailing`: the text before the first known
/// delimiter must itself be a three-field parenthesized triple.
pub fn delimiter_terminated(line: &str, delimiters: &[String]) -> Option<Triple> {
    let delimiter = delimiters
        .iter()
        .find(|d| !d.is_empty() && line.contains(d.as_str()))?;
    let head = line.split(delimiter.as_str()).next()?.trim();
    parenthesized_csv(head)
}

/// Anything with at least two commas and a bracketed span: the content
/// between the first `(` and the last `)` is split on commas and the first
/// three fields are kept. Extra fields are dropped.
pub fn loose_brackets(line: &str) -> Option<Triple> {
    if line.matches(',').count() < 2 {
        return None;
    }
    let start = line.find('(')?;
    let end = line.rfind(')')?;
    if end <= start {
        return None;
    }
    let parts: Vec<&str> = line[start + 1..end].split(',').map(normalize_field).collect();
    if parts.len() < 3 {
        return None;
    }
    Triple::new(parts[0], parts[1], parts[2])
}

/// Per-call statistics, mostly for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub lines: usize,
    pub accepted: usize,
    pub repeated: usize,
    pub by_strategy: [usize; 4],
}

#[derive(Debug, Clone)]
pub struct TripleParser {
    delimiters: Vec<String>,
}

impl Default for TripleParser {
    fn default() -> Self {
        Self::new(vec![
            TRIPLE_DELIMITER.to_string(),
            DELIMITER_PLACEHOLDER.to_string(),
        ])
    }
}

impl TripleParser {
    pub fn new(delimiters: Vec<String>) -> Self {
        Self { delimiters }
    }

    /// Run the strategies over one line. Returns the index of the strategy
    /// that accepted it along with the triple.
    pub fn parse_line(&self, line: &str) -> Option<(usize, Triple)> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        STRATEGIES
            .iter()
            .enumerate()
            .find_map(|(idx, strategy)| (strategy.apply)(line, &self.delimiters).map(|t| (idx, t)))
    }

    /// Parse a whole response. Every accepted line yields one triple, in line
    /// order; repeats are kept and only counted.
    pub fn parse(&self, response: &str) -> Vec<Triple> {
        self.parse_with_report(response).0
    }

    pub fn parse_with_report(&self, response: &str) -> (Vec<Triple>, ParseReport) {
        let mut report = ParseReport::default();
        let mut seen = HashSet::new();
        let mut triples = Vec::new();

        for line in response.split('\n') {
            report.lines += 1;
            let Some((strategy, triple)) = self.parse_line(line) else {
                continue;
            };
            report.by_strategy[strategy] += 1;
            if !seen.insert(triple.clone()) {
                report.repeated += 1;
            }
            triples.push(triple);
        }
        report.accepted = triples.len();

        debug!(
            lines = report.lines,
            accepted = report.accepted,
            repeated = report.repeated,
            parenthesized = report.by_strategy[0],
            labeled = report.by_strategy[1],
            delimited = report.by_strategy[2],
            loose = report.by_strategy[3],
            "Parsed generator response"
        );

        (triples, report)
    }
}
