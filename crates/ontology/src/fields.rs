use ingest::{Section, SectionText, segment_sections};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }
}

/// Field name to value. Names are the keys of the mapper's field table;
/// anything else is dropped at mapping time.
pub type FieldMap = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StructuredFields {
    pub document_id: String,
    pub title: String,
    pub product: FieldMap,
    pub company: FieldMap,
    pub ingredients: Vec<FieldMap>,
    pub hazards: Vec<FieldMap>,
    pub physical_properties: FieldMap,
    pub sections: Vec<SectionText>,
}

fn compile(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .ok()
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| compile($re));
    };
}

pattern!(PRODUCT_NAME, r"\b(?:product|trade|commercial)[ \t]*name[:\- \t]+([^\n\r]+)");
pattern!(PRODUCT_CODE, r"\b(?:product[ \t]*code|item[ \t]*number|part[ \t]*number)[:\- \t]+([^\n\r]+)");
pattern!(RECOMMENDED_USE, r"\brecommended[ \t]*use[:\- \t]+([^\n\r]+)");
pattern!(COMPANY, r"\b(?:company(?:[ \t]*name)?|manufacturer|supplier)[ \t]*[:\-][ \t]*([^\n\r]+)");
pattern!(ADDRESS, r"\baddress[ \t]*[:\-][ \t]*([^\n\r]+)");
pattern!(PHONE, r"^[ \t]*(?:phone|tel|telephone)(?:[ \t]*(?:number|no\.?))?[ \t]*[:\-][ \t]*([^\n\r]+)");
pattern!(EMERGENCY_PHONE, r"\bemergency[ \t]*(?:phone|tel|telephone)(?:[ \t]*(?:number|no\.?))?[ \t]*[:\-][ \t]*([^\n\r]+)");
pattern!(CAS_NUMBER, r"\b(\d{1,7}-\d{2}-\d)\b");
pattern!(PERCENT, r"(\d+(?:\.\d+)?)\s*%");
pattern!(NAME_TAIL, r"[\s(\[,:;#-]*(?:cas\b[\s.#:]*(?:no\.?|number)?[\s.#:]*)?$");
pattern!(SIGNAL_WORD, r"\bsignal[ \t]*word[:\- \t]*(danger|warning)");
pattern!(HAZARD_CODE, r"\b(H\d{3})\b[:\- \t]*([^\n\r]+)");
pattern!(PRECAUTION_CODE, r"\b(P\d{3})\b[:\- \t]*([^\n\r]+)");
pattern!(PHYSICAL_STATE, r"\bphysical[ \t]*state[ \t]*[:\-][ \t]*([^\n\r]+)");
pattern!(COLOR, r"\bcolou?r[ \t]*[:\-][ \t]*([^\n\r]+)");
pattern!(ODOR, r"\bodou?r[ \t]*[:\-][ \t]*([^\n\r]+)");
pattern!(PH, r"\bph\b[:\- \t]*(-?\d+(?:\.\d+)?)");
pattern!(BOILING_POINT, r"\bboiling[ \t]*point[^\d\n\r-]{0,30}(-?\d+(?:\.\d+)?)");
pattern!(MELTING_POINT, r"\bmelting[ \t]*point[^\d\n\r-]{0,30}(-?\d+(?:\.\d+)?)");
pattern!(FLASH_POINT, r"\bflash[ \t]*point[^\d\n\r-]{0,30}(-?\d+(?:\.\d+)?)");
pattern!(DENSITY, r"\bdensity[^\d\n\r-]{0,30}(\d+(?:\.\d+)?)");

fn capture(pattern: &LazyLock<Option<Regex>>, text: &str) -> Option<String> {
    let regex = pattern.as_ref()?;
    let value = regex.captures(text)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn number(pattern: &LazyLock<Option<Regex>>, text: &str) -> Option<f64> {
    capture(pattern, text)?.parse().ok()
}

fn put_text(map: &mut FieldMap, field: &str, value: Option<String>) {
    if let Some(value) = value {
        map.insert(field.to_string(), FieldValue::Text(value));
    }
}

fn put_number(map: &mut FieldMap, field: &str, value: Option<f64>) {
    if let Some(value) = value {
        map.insert(field.to_string(), FieldValue::Number(value));
    }
}

pub fn product_info(text: &str) -> FieldMap {
    let mut product = FieldMap::new();
    put_text(&mut product, "product_name", capture(&PRODUCT_NAME, text));
    put_text(&mut product, "product_code", capture(&PRODUCT_CODE, text));
    put_text(&mut product, "recommended_use", capture(&RECOMMENDED_USE, text));
    product
}

pub fn company_info(text: &str) -> FieldMap {
    let mut company = FieldMap::new();
    put_text(&mut company, "company_name", capture(&COMPANY, text));
    put_text(&mut company, "address", capture(&ADDRESS, text));
    put_text(&mut company, "phone_number", capture(&PHONE, text));
    put_text(&mut company, "emergency_phone", capture(&EMERGENCY_PHONE, text));
    company
}

/// One record per line carrying a CAS number.
pub fn ingredients(text: &str) -> Vec<FieldMap> {
    let (Some(cas), Some(percent), Some(tail)) = (
        CAS_NUMBER.as_ref(),
        PERCENT.as_ref(),
        NAME_TAIL.as_ref(),
    ) else {
        return Vec::new();
    };

    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            let found = cas.captures(line)?.get(1)?;
            let mut ingredient = FieldMap::new();
            ingredient.insert("cas_number".into(), FieldValue::text(found.as_str()));

            put_number(
                &mut ingredient,
                "weight_percent",
                percent
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok()),
            );

            let name = tail.replace(&line[..found.start()], "");
            let name = name.trim();
            if !name.is_empty() {
                ingredient.insert("ingredient_name".into(), FieldValue::text(name));
            }
            Some(ingredient)
        })
        .collect()
}

/// H-code lines become hazard statements carrying the signal word,
/// P-code lines precautionary statements.
pub fn hazards(text: &str) -> Vec<FieldMap> {
    let signal_word = capture(&SIGNAL_WORD, text);
    let mut hazards = Vec::new();

    let coded = [
        (&HAZARD_CODE, "hazard_statement"),
        (&PRECAUTION_CODE, "precautionary_statement"),
    ];
    for (pattern, field) in coded {
        let Some(regex) = pattern.as_ref() else {
            continue;
        };
        for caps in regex.captures_iter(text) {
            let (Some(code), Some(statement)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let mut hazard = FieldMap::new();
            hazard.insert("hazard_code".into(), FieldValue::text(code.as_str().to_uppercase()));
            hazard.insert(field.into(), FieldValue::text(statement.as_str().trim()));
            if field == "hazard_statement" {
                put_text(&mut hazard, "signal_word", signal_word.clone());
            }
            hazards.push(hazard);
        }
    }
    hazards
}

pub fn physical_properties(text: &str) -> FieldMap {
    let mut properties = FieldMap::new();
    put_text(&mut properties, "physical_state", capture(&PHYSICAL_STATE, text));
    put_text(&mut properties, "color", capture(&COLOR, text));
    put_text(&mut properties, "odor", capture(&ODOR, text));
    put_number(&mut properties, "ph", number(&PH, text));
    put_number(&mut properties, "boiling_point", number(&BOILING_POINT, text));
    put_number(&mut properties, "melting_point", number(&MELTING_POINT, text));
    put_number(&mut properties, "flash_point", number(&FLASH_POINT, text));
    put_number(&mut properties, "density", number(&DENSITY, text));
    properties
}

/// Segment a document and pull structured fields out of the sections
/// that carry them.
pub fn extract_fields(document_id: &str, title: &str, text: &str) -> StructuredFields {
    let sections = segment_sections(text);
    let body = |wanted: Section| {
        sections
            .iter()
            .find(|s| s.section == wanted)
            .map(|s| s.body.as_str())
    };

    let mut fields = StructuredFields {
        document_id: document_id.to_string(),
        title: title.to_string(),
        ..StructuredFields::default()
    };

    if let Some(text) = body(Section::Identification) {
        fields.product = product_info(text);
        fields.company = company_info(text);
    }
    if let Some(text) = body(Section::Composition) {
        fields.ingredients = ingredients(text);
    }
    if let Some(text) = body(Section::HazardsIdentification) {
        fields.hazards = hazards(text);
    }
    if let Some(text) = body(Section::PhysicalChemical) {
        fields.physical_properties = physical_properties(text);
    }

    fields.sections = sections;
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Section 1: Identification
Product Name: WD-40 Multi-Use Product
Product Code: 110071
Recommended Use: Lubricant, penetrant
Manufacturer: WD-40 Company
Address: 9715 Businesspark Avenue, San Diego, CA 92131
Phone: 1-888-324-7596
Emergency Phone: 1-888-324-7596
Section 2: Hazards Identification
Signal Word: Danger
H222 Extremely flammable aerosol.
H304 May be fatal if swallowed and enters airways.
P210 Keep away from heat.
Section 3: Composition/Information on Ingredients
LVP Aliphatic Hydrocarbon (CAS# 64742-47-8) 45-50%
Petroleum Base Oil, 64742-56-9, 25%
Section 9: Physical and Chemical Properties
Physical State: Liquid
Color: Light Amber
Odor: Mild petroleum odor
Boiling Point: 361 - 369 °F
Flash Point: -20 °C
Density: 0.8 g/cm3
";

    #[test]
    fn identification_fields() {
        let fields = extract_fields("doc", "WD-40", SAMPLE);
        assert_eq!(fields.product["product_name"], FieldValue::text("WD-40 Multi-Use Product"));
        assert_eq!(fields.product["product_code"], FieldValue::text("110071"));
        assert_eq!(fields.company["company_name"], FieldValue::text("WD-40 Company"));
        assert_eq!(fields.company["phone_number"], FieldValue::text("1-888-324-7596"));
        assert_eq!(fields.company["emergency_phone"], FieldValue::text("1-888-324-7596"));
    }

    #[test]
    fn ingredients_per_cas_line() {
        let fields = extract_fields("doc", "WD-40", SAMPLE);
        assert_eq!(fields.ingredients.len(), 2);
        let first = &fields.ingredients[0];
        assert_eq!(first["cas_number"], FieldValue::text("64742-47-8"));
        assert_eq!(first["ingredient_name"], FieldValue::text("LVP Aliphatic Hydrocarbon"));
        assert_eq!(first["weight_percent"], FieldValue::Number(50.0));
        assert_eq!(
            fields.ingredients[1]["ingredient_name"],
            FieldValue::text("Petroleum Base Oil")
        );
    }

    #[test]
    fn hazard_and_precaution_codes() {
        let fields = extract_fields("doc", "WD-40", SAMPLE);
        assert_eq!(fields.hazards.len(), 3);
        assert_eq!(fields.hazards[0]["hazard_code"], FieldValue::text("H222"));
        assert_eq!(fields.hazards[0]["signal_word"], FieldValue::text("Danger"));
        assert_eq!(
            fields.hazards[2]["precautionary_statement"],
            FieldValue::text("Keep away from heat.")
        );
        assert!(!fields.hazards[2].contains_key("signal_word"));
    }

    #[test]
    fn physical_numbers_are_numeric() {
        let fields = extract_fields("doc", "WD-40", SAMPLE);
        let props = &fields.physical_properties;
        assert_eq!(props["physical_state"], FieldValue::text("Liquid"));
        assert_eq!(props["boiling_point"], FieldValue::Number(361.0));
        assert_eq!(props["flash_point"], FieldValue::Number(-20.0));
        assert_eq!(props["density"], FieldValue::Number(0.8));
        assert!(!props.contains_key("ph"));
    }

    #[test]
    fn all_patterns_compile() {
        for pattern in [
            &PRODUCT_NAME, &PRODUCT_CODE, &RECOMMENDED_USE, &COMPANY, &ADDRESS, &PHONE,
            &EMERGENCY_PHONE, &CAS_NUMBER, &PERCENT, &NAME_TAIL, &SIGNAL_WORD, &HAZARD_CODE,
            &PRECAUTION_CODE, &PHYSICAL_STATE, &COLOR, &ODOR, &PH, &BOILING_POINT,
            &MELTING_POINT, &FLASH_POINT, &DENSITY,
        ] {
            assert!(pattern.is_some());
        }
    }

    #[test]
    fn missing_sections_leave_fields_empty() {
        let fields = extract_fields("doc", "x", "nothing structured here");
        assert!(fields.product.is_empty());
        assert!(fields.ingredients.is_empty());
        assert!(fields.sections.is_empty());
    }
}
