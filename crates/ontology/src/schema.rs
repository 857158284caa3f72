//! The closed MSDS ontology: static class and property tables plus the
//! cardinality restrictions and section disjointness built on top of them.

use ingest::Section;
use serde::Serialize;

use crate::rdf::{DCTERMS_NS, MSDS_NS, OWL_NS, RDF_TYPE, RDFS_NS, Statement, Term, XSD_NS};

pub const ONTOLOGY_NAME: &str = "MSDS_Ontology";
pub const ONTOLOGY_TITLE: &str = "SAP KGE MSDS Ontology";
pub const ONTOLOGY_VERSION: &str = "2.0";

pub const DOCUMENT_CLASS: &str = "MSDS_Document";
pub const SECTION_CLASS: &str = "Section";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
}

impl ValueType {
    pub fn xsd_iri(self) -> String {
        let local = match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Decimal => "decimal",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::DateTime => "dateTime",
        };
        format!("{XSD_NS}{local}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OntologyClass {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub label: String,
    pub comment: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectProperty {
    pub name: &'static str,
    pub domain: &'static str,
    pub range: &'static str,
    pub label: &'static str,
    pub comment: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataProperty {
    pub name: &'static str,
    pub domain: &'static str,
    pub value_type: ValueType,
    pub label: &'static str,
    pub comment: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardinalityKind {
    Min,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardinalityRestriction {
    pub class: &'static str,
    pub property: &'static str,
    pub kind: CardinalityKind,
    pub bound: u32,
}

const SUPPORTING_CLASSES: &[(&str, &str)] = &[
    ("Ingredient", "Chemical ingredient or component"),
    ("Hazard", "Safety hazard or risk"),
    ("FirstAidMeasure", "First aid procedure or measure"),
    ("FireFightingMeasure", "Fire fighting procedure or equipment"),
    ("AccidentalReleaseMeasure", "Procedure for handling accidental releases"),
    ("StorageCondition", "Storage requirement or condition"),
    ("ExposureControl", "Exposure control measure"),
    ("PhysicalChemicalProperty", "Physical or chemical property"),
    ("StabilityReactivity", "Stability and reactivity information"),
    ("ToxicologicalInfo", "Toxicological information"),
    ("EcologicalInfo", "Ecological impact information"),
    ("DisposalMethod", "Disposal procedure or method"),
    ("TransportationInfo", "Transportation requirement or information"),
    ("Regulation", "Regulatory requirement or standard"),
    ("OtherInfo", "Additional miscellaneous information"),
    ("Company", "Company or organization"),
    ("Product", "Chemical product"),
    ("EmergencyContact", "Emergency contact information"),
    ("PhysicalState", "Physical state of matter"),
    ("HazardClass", "Classification of hazard type"),
    ("ProtectiveEquipment", "Personal protective equipment"),
    ("ExposureLimit", "Occupational exposure limit"),
    ("TestMethod", "Testing or measurement method"),
];

// (name, domain, range, comment)
const OBJECT_PROPERTIES: &[(&str, &str, &str, &str)] = &[
    ("hasSection", "MSDS_Document", "Section", "Links document to its sections"),
    ("hasCompany", "MSDS_Document", "Company", "Links document to responsible company"),
    ("hasProduct", "MSDS_Document", "Product", "Links document to the product described"),
    ("hasIngredient", "Composition_Information_on_Ingredients", "Ingredient", "Links to chemical ingredients"),
    ("hasHazard", "Hazards_Identification", "Hazard", "Links to identified hazards"),
    ("hasFirstAid", "First_Aid_Measures", "FirstAidMeasure", "Links to first aid procedures"),
    ("hasFireFightingMeasure", "Fire_Fighting_Measures", "FireFightingMeasure", "Links to fire fighting measures"),
    ("hasAccidentalReleaseMeasure", "Accidental_Release_Measures", "AccidentalReleaseMeasure", "Links to release procedures"),
    ("hasStorageCondition", "Handling_and_Storage", "StorageCondition", "Links to storage requirements"),
    ("hasExposureControl", "Exposure_Controls_Personal_Protection", "ExposureControl", "Links to exposure controls"),
    ("hasPhysicalChemicalProperty", "Physical_and_Chemical_Properties", "PhysicalChemicalProperty", "Links to physical/chemical properties"),
    ("hasStabilityReactivity", "Stability_and_Reactivity", "StabilityReactivity", "Links to stability information"),
    ("hasToxicologicalInfo", "Toxicological_Information", "ToxicologicalInfo", "Links to toxicological data"),
    ("hasEcologicalInfo", "Ecological_Information", "EcologicalInfo", "Links to ecological information"),
    ("hasDisposal", "Disposal_Considerations", "DisposalMethod", "Links to disposal methods"),
    ("hasTransportationInfo", "Transportation_Information", "TransportationInfo", "Links to transportation requirements"),
    ("hasRegulation", "Regulatory_Information", "Regulation", "Links to regulatory information"),
    ("hasOtherInfo", "Other_Information", "OtherInfo", "Links to additional information"),
    ("hasEmergencyContact", "Company", "EmergencyContact", "Links company to emergency contacts"),
    ("hasPhysicalState", "PhysicalChemicalProperty", "PhysicalState", "Links to physical state"),
    ("hasHazardClass", "Hazard", "HazardClass", "Links hazard to its classification"),
    ("requiresProtectiveEquipment", "ExposureControl", "ProtectiveEquipment", "Links to required PPE"),
    ("hasExposureLimit", "Ingredient", "ExposureLimit", "Links ingredient to exposure limits"),
    ("testedBy", "PhysicalChemicalProperty", "TestMethod", "Links property to test method"),
    ("isMainIngredient", "Product", "Ingredient", "Links product to main ingredients"),
    ("containsIngredient", "Product", "Ingredient", "Links product to all ingredients"),
    ("causedBy", "Hazard", "Ingredient", "Links hazard to causing ingredient"),
    ("mitigatedBy", "Hazard", "ProtectiveEquipment", "Links hazard to mitigation equipment"),
];

use ValueType::{Boolean, Date, DateTime, Decimal, Integer, String as Text};

// (name, domain, value type, comment)
const DATA_PROPERTIES: &[(&str, &str, ValueType, &str)] = &[
    ("sectionTitle", "Section", Text, "Title of the section"),
    ("sectionText", "Section", Text, "Full text content of the section"),
    ("sectionNumber", "Section", Integer, "Section number"),
    ("lastUpdated", "Section", DateTime, "Last update timestamp"),
    ("documentId", "MSDS_Document", Text, "Unique document identifier"),
    ("documentVersion", "MSDS_Document", Text, "Document version"),
    ("issueDate", "MSDS_Document", Date, "Document issue date"),
    ("revisionDate", "MSDS_Document", Date, "Document revision date"),
    ("language", "MSDS_Document", Text, "Document language"),
    ("companyName", "Company", Text, "Name of the company"),
    ("address", "Company", Text, "Company address"),
    ("phoneNumber", "Company", Text, "Company phone number"),
    ("emergencyPhone", "Company", Text, "Emergency contact phone"),
    ("website", "Company", Text, "Company website URL"),
    ("productName", "Product", Text, "Name of the product"),
    ("productCode", "Product", Text, "Product identification code"),
    ("productType", "Product", Text, "Type or category of product"),
    ("recommendedUse", "Product", Text, "Recommended use of the product"),
    ("restrictedUse", "Product", Text, "Restricted uses of the product"),
    ("ingredientName", "Ingredient", Text, "Name of the ingredient"),
    ("casNumber", "Ingredient", Text, "CAS registry number"),
    ("ecNumber", "Ingredient", Text, "EC number"),
    ("weightPercent", "Ingredient", Decimal, "Weight percentage in product"),
    ("concentrationRange", "Ingredient", Text, "Concentration range"),
    ("purity", "Ingredient", Decimal, "Purity percentage"),
    ("hazardStatement", "Hazard", Text, "Hazard statement text"),
    ("hazardCategory", "Hazard", Text, "Hazard category classification"),
    ("hazardCode", "Hazard", Text, "Hazard identification code"),
    ("precautionaryStatement", "Hazard", Text, "Precautionary statement"),
    ("signalWord", "Hazard", Text, "Signal word (Danger/Warning)"),
    ("firstAidType", "FirstAidMeasure", Text, "Type of first aid (eye, skin, inhalation, ingestion)"),
    ("firstAidInstruction", "FirstAidMeasure", Text, "Detailed first aid instructions"),
    ("immediateAction", "FirstAidMeasure", Text, "Immediate action required"),
    ("medicalAttention", "FirstAidMeasure", Boolean, "Whether medical attention is required"),
    ("extinguishingMedia", "FireFightingMeasure", Text, "Suitable extinguishing media"),
    ("unsuitableMedia", "FireFightingMeasure", Text, "Unsuitable extinguishing media"),
    ("specificHazards", "FireFightingMeasure", Text, "Specific fire hazards"),
    ("protectiveEquipment", "FireFightingMeasure", Text, "Required protective equipment"),
    ("physicalState", "PhysicalChemicalProperty", Text, "Physical state (solid, liquid, gas)"),
    ("color", "PhysicalChemicalProperty", Text, "Color description"),
    ("odor", "PhysicalChemicalProperty", Text, "Odor description"),
    ("pH", "PhysicalChemicalProperty", Decimal, "pH value"),
    ("meltingPoint", "PhysicalChemicalProperty", Decimal, "Melting point in Celsius"),
    ("boilingPoint", "PhysicalChemicalProperty", Decimal, "Boiling point in Celsius"),
    ("flashPoint", "PhysicalChemicalProperty", Decimal, "Flash point in Celsius"),
    ("density", "PhysicalChemicalProperty", Decimal, "Density in g/cm³"),
    ("solubility", "PhysicalChemicalProperty", Text, "Solubility information"),
    ("vaporPressure", "PhysicalChemicalProperty", Decimal, "Vapor pressure"),
    ("exposureLimit", "ExposureControl", Decimal, "Occupational exposure limit"),
    ("exposureLimitUnit", "ExposureControl", Text, "Unit for exposure limit"),
    ("exposureLimitType", "ExposureControl", Text, "Type of exposure limit (TWA, STEL, etc.)"),
    ("personalProtection", "ExposureControl", Text, "Personal protection requirements"),
    ("stability", "StabilityReactivity", Text, "Chemical stability information"),
    ("reactivity", "StabilityReactivity", Text, "Reactivity information"),
    ("incompatibleMaterials", "StabilityReactivity", Text, "Materials to avoid"),
    ("hazardousDecomposition", "StabilityReactivity", Text, "Hazardous decomposition products"),
    ("toxicEffect", "ToxicologicalInfo", Text, "Toxic effects description"),
    ("routeOfExposure", "ToxicologicalInfo", Text, "Route of exposure"),
    ("acuteToxicity", "ToxicologicalInfo", Text, "Acute toxicity information"),
    ("chronicToxicity", "ToxicologicalInfo", Text, "Chronic toxicity information"),
    ("ld50", "ToxicologicalInfo", Decimal, "LD50 value"),
    ("ecoToxicity", "EcologicalInfo", Text, "Ecotoxicity information"),
    ("biodegradability", "EcologicalInfo", Text, "Biodegradability information"),
    ("bioaccumulation", "EcologicalInfo", Text, "Bioaccumulation potential"),
    ("environmentalFate", "EcologicalInfo", Text, "Environmental fate information"),
    ("disposalMethod", "DisposalMethod", Text, "Disposal method description"),
    ("wasteCode", "DisposalMethod", Text, "Waste classification code"),
    ("specialPrecautions", "DisposalMethod", Text, "Special disposal precautions"),
    ("unNumber", "TransportationInfo", Text, "UN identification number"),
    ("properShippingName", "TransportationInfo", Text, "Proper shipping name"),
    ("transportHazardClass", "TransportationInfo", Text, "Transport hazard class"),
    ("packingGroup", "TransportationInfo", Text, "Packing group"),
    ("marinePollutant", "TransportationInfo", Boolean, "Marine pollutant status"),
    ("regulationName", "Regulation", Text, "Name of regulation"),
    ("regulationDetail", "Regulation", Text, "Regulation details"),
    ("complianceStatus", "Regulation", Text, "Compliance status"),
    ("regulationCountry", "Regulation", Text, "Country of regulation"),
    ("otherDetail", "OtherInfo", Text, "Additional information details"),
    ("disclaimer", "OtherInfo", Text, "Disclaimer text"),
    ("preparationDate", "OtherInfo", Date, "Preparation date"),
    ("preparedBy", "OtherInfo", Text, "Prepared by information"),
];

const RESTRICTIONS: &[(&str, &str, CardinalityKind, u32)] = &[
    (DOCUMENT_CLASS, "hasSection", CardinalityKind::Min, 1),
    (DOCUMENT_CLASS, "hasCompany", CardinalityKind::Exact, 1),
];

fn section_comment(section: Section) -> &'static str {
    match section {
        Section::Identification => "Product and company identification information",
        Section::HazardsIdentification => "Classification and hazard information",
        Section::Composition => "Information on ingredients and composition",
        Section::FirstAid => "First aid procedures and measures",
        Section::FireFighting => "Fire fighting procedures and equipment",
        Section::AccidentalRelease => "Procedures for handling accidental releases",
        Section::HandlingStorage => "Safe handling and storage conditions",
        Section::ExposureControls => "Exposure controls and personal protection",
        Section::PhysicalChemical => "Physical and chemical properties",
        Section::StabilityReactivity => "Stability and reactivity information",
        Section::Toxicological => "Toxicological effects and information",
        Section::Ecological => "Ecological effects and environmental impact",
        Section::Disposal => "Disposal methods and considerations",
        Section::Transport => "Transportation requirements and information",
        Section::Regulatory => "Regulatory and compliance information",
        Section::Other => "Additional miscellaneous information",
    }
}

/// Names of every data property, in table order. This is the allow-list
/// handed to the ontology-aware extraction prompt.
pub fn allowed_attributes() -> Vec<String> {
    DATA_PROPERTIES.iter().map(|(name, ..)| name.to_string()).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Ontology {
    pub base_iri: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub version: &'static str,
    pub classes: Vec<OntologyClass>,
    pub object_properties: Vec<ObjectProperty>,
    pub data_properties: Vec<DataProperty>,
    pub restrictions: Vec<CardinalityRestriction>,
    /// Pairs of mutually disjoint classes.
    pub disjoint: Vec<(&'static str, &'static str)>,
}

/// Build the fixed schema. Pure and deterministic.
pub fn build_schema() -> Ontology {
    let mut classes = vec![
        OntologyClass {
            name: DOCUMENT_CLASS,
            parent: None,
            label: "MSDS Document".to_string(),
            comment: "Material Safety Data Sheet document containing safety information",
        },
        OntologyClass {
            name: SECTION_CLASS,
            parent: None,
            label: "Section".to_string(),
            comment: "Abstract class representing a section of an MSDS document",
        },
    ];

    classes.extend(Section::ALL.iter().map(|&section| OntologyClass {
        name: section.ontology_class(),
        parent: Some(SECTION_CLASS),
        label: section.ontology_class().replace('_', " "),
        comment: section_comment(section),
    }));

    classes.extend(SUPPORTING_CLASSES.iter().map(|&(name, comment)| OntologyClass {
        name,
        parent: None,
        label: name.to_string(),
        comment,
    }));

    let object_properties = OBJECT_PROPERTIES
        .iter()
        .map(|&(name, domain, range, comment)| ObjectProperty {
            name,
            domain,
            range,
            label: name,
            comment,
        })
        .collect();

    let data_properties = DATA_PROPERTIES
        .iter()
        .map(|&(name, domain, value_type, comment)| DataProperty {
            name,
            domain,
            value_type,
            label: name,
            comment,
        })
        .collect();

    let restrictions = RESTRICTIONS
        .iter()
        .map(|&(class, property, kind, bound)| CardinalityRestriction {
            class,
            property,
            kind,
            bound,
        })
        .collect();

    let mut disjoint = Vec::new();
    for (i, a) in Section::ALL.iter().enumerate() {
        for b in &Section::ALL[i + 1..] {
            disjoint.push((a.ontology_class(), b.ontology_class()));
        }
    }

    Ontology {
        base_iri: MSDS_NS,
        name: ONTOLOGY_NAME,
        title: ONTOLOGY_TITLE,
        version: ONTOLOGY_VERSION,
        classes,
        object_properties,
        data_properties,
        restrictions,
        disjoint,
    }
}

impl Ontology {
    pub fn iri(&self, name: &str) -> String {
        format!("{}{name}", self.base_iri)
    }

    pub fn class(&self, name: &str) -> Option<&OntologyClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn object_property(&self, name: &str) -> Option<&ObjectProperty> {
        self.object_properties.iter().find(|p| p.name == name)
    }

    pub fn data_property(&self, name: &str) -> Option<&DataProperty> {
        self.data_properties.iter().find(|p| p.name == name)
    }

    /// The schema as RDF statements. Restrictions become blank nodes
    /// attached to their class through `rdfs:subClassOf`.
    pub fn statements(&self) -> Vec<Statement> {
        let rdfs = |local: &str| format!("{RDFS_NS}{local}");
        let owl = |local: &str| format!("{OWL_NS}{local}");
        let en = |text: &str| Term::lang(text, "en");

        let mut out = Vec::new();
        let ontology = Term::iri(self.iri(self.name));
        out.push(Statement::new(ontology.clone(), RDF_TYPE, Term::iri(owl("Ontology"))));
        out.push(Statement::new(ontology.clone(), format!("{DCTERMS_NS}title"), en(self.title)));
        out.push(Statement::new(
            ontology.clone(),
            format!("{DCTERMS_NS}description"),
            en("Comprehensive ontology for Material Safety Data Sheet documents"),
        ));
        out.push(Statement::new(ontology, owl("versionInfo"), Term::literal(self.version)));

        for class in &self.classes {
            let subject = Term::iri(self.iri(class.name));
            out.push(Statement::new(subject.clone(), RDF_TYPE, Term::iri(owl("Class"))));
            if let Some(parent) = class.parent {
                out.push(Statement::new(subject.clone(), rdfs("subClassOf"), Term::iri(self.iri(parent))));
            }
            out.push(Statement::new(subject.clone(), rdfs("label"), en(class.label.as_str())));
            out.push(Statement::new(subject, rdfs("comment"), en(class.comment)));
        }

        for property in &self.object_properties {
            let subject = Term::iri(self.iri(property.name));
            out.push(Statement::new(subject.clone(), RDF_TYPE, Term::iri(owl("ObjectProperty"))));
            out.push(Statement::new(subject.clone(), rdfs("domain"), Term::iri(self.iri(property.domain))));
            out.push(Statement::new(subject.clone(), rdfs("range"), Term::iri(self.iri(property.range))));
            out.push(Statement::new(subject.clone(), rdfs("label"), en(property.label)));
            out.push(Statement::new(subject, rdfs("comment"), en(property.comment)));
        }

        for property in &self.data_properties {
            let subject = Term::iri(self.iri(property.name));
            out.push(Statement::new(subject.clone(), RDF_TYPE, Term::iri(owl("DatatypeProperty"))));
            out.push(Statement::new(subject.clone(), rdfs("domain"), Term::iri(self.iri(property.domain))));
            out.push(Statement::new(subject.clone(), rdfs("range"), Term::iri(property.value_type.xsd_iri())));
            out.push(Statement::new(subject.clone(), rdfs("label"), en(property.label)));
            out.push(Statement::new(subject, rdfs("comment"), en(property.comment)));
        }

        for (i, restriction) in self.restrictions.iter().enumerate() {
            let node = Term::blank(format!("restriction{}", i + 1));
            let cardinality = match restriction.kind {
                CardinalityKind::Min => owl("minCardinality"),
                CardinalityKind::Exact => owl("cardinality"),
            };
            out.push(Statement::new(node.clone(), RDF_TYPE, Term::iri(owl("Restriction"))));
            out.push(Statement::new(node.clone(), owl("onProperty"), Term::iri(self.iri(restriction.property))));
            out.push(Statement::new(
                node.clone(),
                cardinality,
                Term::typed(restriction.bound.to_string(), format!("{XSD_NS}nonNegativeInteger")),
            ));
            out.push(Statement::new(Term::iri(self.iri(restriction.class)), rdfs("subClassOf"), node));
        }

        for (a, b) in &self.disjoint {
            out.push(Statement::new(Term::iri(self.iri(a)), owl("disjointWith"), Term::iri(self.iri(b))));
        }

        out
    }
}
