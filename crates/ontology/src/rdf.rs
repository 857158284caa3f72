//! RDF terms, IRI minting and the Turtle, N-Triples and RDF/XML writers.

use extract::Triple;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::{RdfError, Result};

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const MSDS_NS: &str = "http://sap.com/kge/msds#";

/// Base for entities named by raw extracted triples.
pub const RESOURCE_BASE: &str = "http://msds.com/resource/";
/// Base for predicates of raw extracted triples.
pub const PROPERTY_BASE: &str = "http://msds.com/property/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

const PREFIXES: [(&str, &str); 6] = [
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("owl", OWL_NS),
    ("xsd", XSD_NS),
    ("dcterms", DCTERMS_NS),
    ("msds", MSDS_NS),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        datatype: Option<String>,
        lang: Option<String>,
    },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Term::Blank(id.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        }
    }

    pub fn lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            lang: Some(lang.into()),
        }
    }

    /// Lexical value for literals, the IRI or blank id otherwise.
    pub fn value(&self) -> &str {
        match self {
            Term::Iri(v) | Term::Blank(v) | Term::Literal { value: v, .. } => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// Append `value` to `base`, percent-encoding every UTF-8 byte outside
/// `[A-Za-z0-9-_.]`.
pub fn mint_iri(base: &str, value: &str) -> String {
    let mut iri = String::with_capacity(base.len() + value.len());
    iri.push_str(base);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            iri.push(byte as char);
        } else {
            let _ = write!(iri, "%{byte:02X}");
        }
    }
    iri
}

/// Escape backslash, double quote, CR and LF for a quoted literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Local name of an IRI with percent escapes decoded, for display.
pub fn display_name(iri: &str) -> String {
    let local = iri.rsplit(['/', '#']).next().unwrap_or(iri);
    let bytes = local.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                decoded.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_digit(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Raw extracted triples as statements: subject and object under the
/// resource base, predicate under the property base, object kept as a
/// plain literal.
pub fn triple_statements(triples: &[Triple]) -> Vec<Statement> {
    triples
        .iter()
        .map(|t| {
            Statement::new(
                Term::iri(mint_iri(RESOURCE_BASE, &t.subject)),
                mint_iri(PROPERTY_BASE, &t.predicate),
                Term::literal(t.object.clone()),
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdfFormat {
    #[default]
    #[serde(alias = "ttl")]
    Turtle,
    #[serde(alias = "nt")]
    NTriples,
    #[serde(rename = "xml", alias = "rdfxml")]
    RdfXml,
}

impl RdfFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::RdfXml => "application/rdf+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            RdfFormat::Turtle => "ttl",
            RdfFormat::NTriples => "nt",
            RdfFormat::RdfXml => "rdf",
        }
    }
}

impl FromStr for RdfFormat {
    type Err = RdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(RdfFormat::Turtle),
            "ntriples" | "nt" => Ok(RdfFormat::NTriples),
            "xml" | "rdfxml" | "rdf/xml" => Ok(RdfFormat::RdfXml),
            other => Err(RdfError::UnknownFormat(other.to_string())),
        }
    }
}

pub fn serialize(statements: &[Statement], format: RdfFormat) -> Result<String> {
    match format {
        RdfFormat::Turtle => Ok(to_turtle(statements)),
        RdfFormat::NTriples => Ok(to_ntriples(statements)),
        RdfFormat::RdfXml => to_rdf_xml(statements),
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", escape_literal(value))
}

/// One statement in N-Triples form, without the trailing newline. This is
/// also the body format of SPARQL `INSERT DATA` blocks.
pub fn ntriples_line(statement: &Statement) -> String {
    format!(
        "{} <{}> {} .",
        ntriples_term(&statement.subject),
        statement.predicate,
        ntriples_term(&statement.object)
    )
}

pub fn ntriples_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{iri}>"),
        Term::Blank(id) => format!("_:{id}"),
        Term::Literal {
            value,
            datatype: Some(dt),
            ..
        } => format!("{}^^<{dt}>", quoted(value)),
        Term::Literal {
            value,
            lang: Some(lang),
            ..
        } => format!("{}@{lang}", quoted(value)),
        Term::Literal { value, .. } => quoted(value),
    }
}

pub fn to_ntriples(statements: &[Statement]) -> String {
    let mut out = String::with_capacity(statements.len() * 96);
    for statement in statements {
        out.push_str(&ntriples_line(statement));
        out.push('\n');
    }
    out
}

/// Statements grouped by subject in first-seen order.
fn group_by_subject(statements: &[Statement]) -> Vec<(&Term, Vec<&Statement>)> {
    let mut index: HashMap<&Term, usize> = HashMap::new();
    let mut groups: Vec<(&Term, Vec<&Statement>)> = Vec::new();
    for statement in statements {
        let slot = *index.entry(&statement.subject).or_insert_with(|| {
            groups.push((&statement.subject, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(statement);
    }
    groups
}

fn is_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// `prefix:local` when the IRI sits in a known namespace, `<iri>` otherwise.
fn turtle_iri(iri: &str) -> String {
    for (prefix, ns) in PREFIXES {
        if let Some(local) = iri.strip_prefix(ns) {
            if is_local_name(local) {
                return format!("{prefix}:{local}");
            }
        }
    }
    format!("<{iri}>")
}

fn turtle_term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => turtle_iri(iri),
        Term::Blank(id) => format!("_:{id}"),
        Term::Literal {
            value,
            datatype: Some(dt),
            ..
        } => format!("{}^^{}", quoted(value), turtle_iri(dt)),
        Term::Literal {
            value,
            lang: Some(lang),
            ..
        } => format!("{}@{lang}", quoted(value)),
        Term::Literal { value, .. } => quoted(value),
    }
}

pub fn to_turtle(statements: &[Statement]) -> String {
    let mut out = String::with_capacity(statements.len() * 80);
    for (prefix, ns) in PREFIXES {
        let _ = writeln!(out, "@prefix {prefix}: <{ns}> .");
    }

    for (subject, group) in group_by_subject(statements) {
        out.push('\n');
        out.push_str(&turtle_term(subject));
        for (i, statement) in group.iter().enumerate() {
            let predicate = if statement.predicate == RDF_TYPE {
                "a".to_string()
            } else {
                turtle_iri(&statement.predicate)
            };
            let separator = if i == 0 { "\n    " } else { " ;\n    " };
            let _ = write!(out, "{separator}{predicate} {}", turtle_term(&statement.object));
        }
        out.push_str(" .\n");
    }
    out
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_ncname(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Split a predicate IRI into namespace and XML local name. The local name
/// is the longest XML-name suffix after the last `/` or `#`, so a minted
/// `property/is%20a` is written as namespace `property/is%20` plus `a` and
/// the IRI survives unchanged.
fn split_qname(iri: &str) -> Result<(&str, &str)> {
    let tail = iri
        .rfind(['#', '/'])
        .map(|i| i + 1)
        .ok_or_else(|| RdfError::NotQName(iri.to_string()))?;
    iri[tail..]
        .char_indices()
        .map(|(i, _)| tail + i)
        .find(|&cut| is_ncname(&iri[cut..]))
        .map(|cut| iri.split_at(cut))
        .ok_or_else(|| RdfError::NotQName(iri.to_string()))
}

/// RDF/XML with one `rdf:Description` per subject. Fails when a predicate
/// cannot be written as an element name.
pub fn to_rdf_xml(statements: &[Statement]) -> Result<String> {
    let mut namespaces: Vec<(String, String)> = PREFIXES
        .iter()
        .map(|(p, ns)| (p.to_string(), ns.to_string()))
        .collect();

    let mut qnames: HashMap<&str, String> = HashMap::new();
    for statement in statements {
        if qnames.contains_key(statement.predicate.as_str()) {
            continue;
        }
        let (ns, local) = split_qname(&statement.predicate)?;
        let prefix = match namespaces.iter().find(|(_, known)| known == ns) {
            Some((prefix, _)) => prefix.clone(),
            None => {
                let prefix = format!("ns{}", namespaces.len() - PREFIXES.len() + 1);
                namespaces.push((prefix.clone(), ns.to_string()));
                prefix
            }
        };
        qnames.insert(&statement.predicate, format!("{prefix}:{local}"));
    }

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rdf:RDF");
    for (prefix, ns) in &namespaces {
        let _ = write!(out, "\n    xmlns:{prefix}=\"{}\"", xml_escape(ns));
    }
    out.push_str(">\n");

    for (subject, group) in group_by_subject(statements) {
        match subject {
            Term::Blank(id) => {
                let _ = writeln!(out, "  <rdf:Description rdf:nodeID=\"{}\">", xml_escape(id));
            }
            other => {
                let _ = writeln!(
                    out,
                    "  <rdf:Description rdf:about=\"{}\">",
                    xml_escape(other.value())
                );
            }
        }
        for statement in group {
            let qname = qnames
                .get(statement.predicate.as_str())
                .ok_or_else(|| RdfError::NotQName(statement.predicate.clone()))?;
            let _ = match &statement.object {
                Term::Iri(iri) => {
                    writeln!(out, "    <{qname} rdf:resource=\"{}\"/>", xml_escape(iri))
                }
                Term::Blank(id) => {
                    writeln!(out, "    <{qname} rdf:nodeID=\"{}\"/>", xml_escape(id))
                }
                Term::Literal {
                    value,
                    datatype: Some(dt),
                    ..
                } => writeln!(
                    out,
                    "    <{qname} rdf:datatype=\"{}\">{}</{qname}>",
                    xml_escape(dt),
                    xml_escape(value)
                ),
                Term::Literal {
                    value,
                    lang: Some(lang),
                    ..
                } => writeln!(
                    out,
                    "    <{qname} xml:lang=\"{}\">{}</{qname}>",
                    xml_escape(lang),
                    xml_escape(value)
                ),
                Term::Literal { value, .. } => {
                    writeln!(out, "    <{qname}>{}</{qname}>", xml_escape(value))
                }
            };
        }
        out.push_str("  </rdf:Description>\n");
    }
    out.push_str("</rdf:RDF>\n");
    Ok(out)
}
