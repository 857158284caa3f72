//! The closed MSDS ontology and the mapping of document fields onto it,
//! with RDF serialization for both.

pub mod error;
pub mod fields;
pub mod mapper;
pub mod rdf;
pub mod schema;

pub use error::{RdfError, Result};
pub use fields::{FieldMap, FieldValue, StructuredFields, extract_fields};
pub use mapper::{FIELD_TABLE, map_instance, property_for};
pub use rdf::{
    RdfFormat, Statement, Term, display_name, escape_literal, mint_iri, serialize,
    triple_statements,
};
pub use schema::{
    CardinalityKind, CardinalityRestriction, DataProperty, ObjectProperty, Ontology,
    OntologyClass, ValueType, allowed_attributes, build_schema,
};

/// Segment, extract and map a document in one step.
pub fn document_statements(document_id: &str, title: &str, text: &str) -> Vec<Statement> {
    map_instance(&extract_fields(document_id, title, text))
}
