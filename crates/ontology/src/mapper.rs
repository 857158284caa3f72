use ingest::Section;
use std::collections::BTreeMap;
use tracing::debug;

use crate::fields::{FieldMap, FieldValue, StructuredFields};
use crate::rdf::{DCTERMS_NS, MSDS_NS, RDF_TYPE, Statement, Term, XSD_NS};
use crate::schema::DOCUMENT_CLASS;

/// Extracted field name to ontology data property. The only place that
/// decides which predicate a field is written with.
pub const FIELD_TABLE: &[(&str, &str)] = &[
    ("product_name", "productName"),
    ("product_code", "productCode"),
    ("product_type", "productType"),
    ("recommended_use", "recommendedUse"),
    ("restricted_use", "restrictedUse"),
    ("company_name", "companyName"),
    ("address", "address"),
    ("phone_number", "phoneNumber"),
    ("emergency_phone", "emergencyPhone"),
    ("website", "website"),
    ("cas_number", "casNumber"),
    ("ec_number", "ecNumber"),
    ("ingredient_name", "ingredientName"),
    ("weight_percent", "weightPercent"),
    ("concentration_range", "concentrationRange"),
    ("hazard_statement", "hazardStatement"),
    ("precautionary_statement", "precautionaryStatement"),
    ("signal_word", "signalWord"),
    ("hazard_code", "hazardCode"),
    ("physical_state", "physicalState"),
    ("color", "color"),
    ("odor", "odor"),
    ("ph", "pH"),
    ("boiling_point", "boilingPoint"),
    ("melting_point", "meltingPoint"),
    ("flash_point", "flashPoint"),
    ("density", "density"),
    ("solubility", "solubility"),
    ("vapor_pressure", "vaporPressure"),
];

pub fn property_for(field: &str) -> Option<&'static str> {
    FIELD_TABLE
        .iter()
        .find(|(name, _)| *name == field)
        .map(|&(_, property)| property)
}

fn msds(local: &str) -> String {
    format!("{MSDS_NS}{local}")
}

/// Number rendered as an `xsd:decimal` lexical form. Infinities and NaN
/// have none.
fn decimal(value: f64) -> Option<String> {
    if !value.is_finite() {
        None
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        Some(format!("{value:.0}"))
    } else {
        Some(value.to_string())
    }
}

struct InstanceWriter<'a> {
    id: &'a str,
    document: Term,
    sections: BTreeMap<Section, Term>,
    out: Vec<Statement>,
}

impl<'a> InstanceWriter<'a> {
    fn new(id: &'a str) -> Self {
        Self {
            id,
            document: Term::iri(msds(&format!("document_{id}"))),
            sections: BTreeMap::new(),
            out: Vec::new(),
        }
    }

    fn push(&mut self, subject: &Term, property: &str, object: Term) {
        self.out.push(Statement::new(subject.clone(), msds(property), object));
    }

    fn typed_node(&mut self, local: String, class: &str) -> Term {
        let node = Term::iri(msds(&local));
        self.out
            .push(Statement::new(node.clone(), RDF_TYPE, Term::iri(msds(class))));
        node
    }

    /// The single node for a section of this document, created on first use.
    fn section(&mut self, section: Section) -> Term {
        if let Some(node) = self.sections.get(&section) {
            return node.clone();
        }
        let node = self.typed_node(
            format!("section{}_{}", section.number(), self.id),
            section.ontology_class(),
        );
        let document = self.document.clone();
        self.push(&document, "hasSection", node.clone());
        self.push(
            &node,
            "sectionNumber",
            Term::typed(section.number().to_string(), format!("{XSD_NS}integer")),
        );
        self.push(&node, "sectionTitle", Term::literal(section.name()));
        self.sections.insert(section, node.clone());
        node
    }

    fn fields(&mut self, subject: &Term, fields: &FieldMap) {
        for (field, value) in fields {
            let Some(property) = property_for(field) else {
                debug!(field = %field, "No ontology property for field, skipped");
                continue;
            };
            let object = match value {
                FieldValue::Text(text) => Term::literal(text.clone()),
                FieldValue::Number(n) => match decimal(*n) {
                    Some(lexical) => Term::typed(lexical, format!("{XSD_NS}decimal")),
                    None => {
                        debug!(field = %field, "Non-finite number, skipped");
                        continue;
                    }
                },
            };
            self.push(subject, property, object);
        }
    }

    /// Entity node linked from `owner`, carrying `fields`.
    fn entity(&mut self, owner: &Term, link: &str, local: String, class: &str, fields: &FieldMap) {
        let node = self.typed_node(local, class);
        self.push(owner, link, node.clone());
        self.fields(&node, fields);
    }
}

/// Map structured fields onto the ontology. Node IRIs derive from the
/// document id, so mapping the same fields twice gives the same output.
/// Fields missing from [`FIELD_TABLE`] are dropped.
pub fn map_instance(fields: &StructuredFields) -> Vec<Statement> {
    let id = fields.document_id.as_str();
    let mut writer = InstanceWriter::new(id);
    let document = writer.document.clone();

    writer
        .out
        .push(Statement::new(document.clone(), RDF_TYPE, Term::iri(msds(DOCUMENT_CLASS))));
    writer.push(&document, "documentId", Term::literal(id));
    writer.out.push(Statement::new(
        document.clone(),
        format!("{DCTERMS_NS}title"),
        Term::literal(format!("MSDS Document - {}", fields.title)),
    ));

    for section in &fields.sections {
        let node = writer.section(section.section);
        if !section.body.is_empty() {
            writer.push(&node, "sectionText", Term::literal(section.body.clone()));
        }
    }

    if !fields.product.is_empty() {
        writer.entity(&document, "hasProduct", format!("product_{id}"), "Product", &fields.product);
    }
    if !fields.company.is_empty() {
        writer.entity(&document, "hasCompany", format!("company_{id}"), "Company", &fields.company);
    }

    if !fields.ingredients.is_empty() {
        let composition = writer.section(Section::Composition);
        for (i, ingredient) in fields.ingredients.iter().enumerate() {
            writer.entity(
                &composition,
                "hasIngredient",
                format!("ingredient_{id}_{}", i + 1),
                "Ingredient",
                ingredient,
            );
        }
    }

    if !fields.hazards.is_empty() {
        let hazards = writer.section(Section::HazardsIdentification);
        for (i, hazard) in fields.hazards.iter().enumerate() {
            writer.entity(&hazards, "hasHazard", format!("hazard_{id}_{}", i + 1), "Hazard", hazard);
        }
    }

    if !fields.physical_properties.is_empty() {
        let physical = writer.section(Section::PhysicalChemical);
        writer.entity(
            &physical,
            "hasPhysicalChemicalProperty",
            format!("property_{id}"),
            "PhysicalChemicalProperty",
            &fields.physical_properties,
        );
    }

    debug!(document_id = id, statements = writer.out.len(), "Mapped document onto ontology");
    writer.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::extract_fields;
    use crate::schema::build_schema;

    const DOC: &str = "\
Section 1: Identification
Product Name: WD-40
Manufacturer: WD-40 Company
Section 2: Hazards Identification
Signal Word: Warning
H226 Flammable liquid and vapour.
Section 3: Composition
Naphtha 64742-47-8 60%
Section 9: Physical and Chemical Properties
Flash Point: 47 °C
";

    fn find<'a>(statements: &'a [Statement], property: &str) -> Vec<&'a Statement> {
        statements
            .iter()
            .filter(|s| s.predicate == msds(property))
            .collect()
    }

    #[test]
    fn every_table_property_exists_in_the_schema() {
        let schema = build_schema();
        for (field, property) in FIELD_TABLE {
            assert!(schema.data_property(property).is_some(), "{field} -> {property}");
        }
    }

    #[test]
    fn numeric_fields_are_typed_decimals() {
        let statements = map_instance(&extract_fields("d1", "WD-40", DOC));
        let weight = find(&statements, "weightPercent");
        assert_eq!(weight.len(), 1);
        assert_eq!(weight[0].object, Term::typed("60", format!("{XSD_NS}decimal")));

        let flash = find(&statements, "flashPoint");
        assert_eq!(flash[0].object, Term::typed("47", format!("{XSD_NS}decimal")));

        let name = find(&statements, "productName");
        assert_eq!(name[0].object, Term::literal("WD-40"));
    }

    #[test]
    fn one_node_per_section() {
        let statements = map_instance(&extract_fields("d1", "WD-40", DOC));
        let sections = find(&statements, "hasSection");
        assert_eq!(sections.len(), 4);
        let composition = Term::iri(msds("section3_d1"));
        assert!(sections.iter().any(|s| s.object == composition));
        let has_ingredient = find(&statements, "hasIngredient");
        assert_eq!(has_ingredient[0].subject, composition);
    }

    #[test]
    fn mapping_is_deterministic() {
        let fields = extract_fields("d1", "WD-40", DOC);
        assert_eq!(map_instance(&fields), map_instance(&fields));
    }

    #[test]
    fn unknown_fields_are_dropped() {
        let mut fields = StructuredFields {
            document_id: "d2".into(),
            title: "x".into(),
            ..StructuredFields::default()
        };
        fields.product.insert("product_name".into(), FieldValue::text("Thing"));
        fields.product.insert("shelf_colour".into(), FieldValue::text("blue"));

        let statements = map_instance(&fields);
        assert_eq!(find(&statements, "productName").len(), 1);
        assert!(statements.iter().all(|s| !s.predicate.contains("shelf")));
        // document type, id, title; product type, link, name
        assert_eq!(statements.len(), 6);
    }

    #[test]
    fn decimal_lexical_forms() {
        assert_eq!(decimal(50.0).as_deref(), Some("50"));
        assert_eq!(decimal(-20.0).as_deref(), Some("-20"));
        assert_eq!(decimal(0.8).as_deref(), Some("0.8"));
        assert_eq!(decimal(f64::INFINITY), None);
        assert_eq!(decimal(f64::NAN), None);
    }

    #[test]
    fn overflowing_numbers_are_not_written() {
        let huge: f64 = "9".repeat(400).parse().unwrap();
        assert!(huge.is_infinite());

        let mut fields = FieldMap::new();
        fields.insert("ph".to_string(), FieldValue::Number(huge));
        fields.insert("flash_point".to_string(), FieldValue::Number(49.0));

        let mut writer = InstanceWriter::new("d1");
        let subject = Term::iri(msds("product_d1"));
        writer.fields(&subject, &fields);
        assert_eq!(writer.out.len(), 1);
        assert_eq!(writer.out[0].predicate, msds("flashPoint"));
    }
}
