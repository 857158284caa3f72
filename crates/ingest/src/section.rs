use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// One of the sixteen regulatory sections of a safety data sheet, in
/// standard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Identification,
    HazardsIdentification,
    Composition,
    FirstAid,
    FireFighting,
    AccidentalRelease,
    HandlingStorage,
    ExposureControls,
    PhysicalChemical,
    StabilityReactivity,
    Toxicological,
    Ecological,
    Disposal,
    Transport,
    Regulatory,
    Other,
}

pub const SECTION_COUNT: usize = 16;

impl Section {
    pub const ALL: [Section; SECTION_COUNT] = [
        Section::Identification,
        Section::HazardsIdentification,
        Section::Composition,
        Section::FirstAid,
        Section::FireFighting,
        Section::AccidentalRelease,
        Section::HandlingStorage,
        Section::ExposureControls,
        Section::PhysicalChemical,
        Section::StabilityReactivity,
        Section::Toxicological,
        Section::Ecological,
        Section::Disposal,
        Section::Transport,
        Section::Regulatory,
        Section::Other,
    ];

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_number(number: u8) -> Option<Section> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Identification => "Identification",
            Section::HazardsIdentification => "Hazard(s) Identification",
            Section::Composition => "Composition/Information on Ingredients",
            Section::FirstAid => "First-Aid Measures",
            Section::FireFighting => "Fire-Fighting Measures",
            Section::AccidentalRelease => "Accidental Release Measures",
            Section::HandlingStorage => "Handling and Storage",
            Section::ExposureControls => "Exposure Controls/Personal Protection",
            Section::PhysicalChemical => "Physical and Chemical Properties",
            Section::StabilityReactivity => "Stability and Reactivity",
            Section::Toxicological => "Toxicological Information",
            Section::Ecological => "Ecological Information",
            Section::Disposal => "Disposal Considerations",
            Section::Transport => "Transport Information",
            Section::Regulatory => "Regulatory Information",
            Section::Other => "Other Information",
        }
    }

    /// Local name of the matching class in the document ontology.
    pub fn ontology_class(self) -> &'static str {
        match self {
            Section::Identification => "Identification",
            Section::HazardsIdentification => "Hazards_Identification",
            Section::Composition => "Composition_Information_on_Ingredients",
            Section::FirstAid => "First_Aid_Measures",
            Section::FireFighting => "Fire_Fighting_Measures",
            Section::AccidentalRelease => "Accidental_Release_Measures",
            Section::HandlingStorage => "Handling_and_Storage",
            Section::ExposureControls => "Exposure_Controls_Personal_Protection",
            Section::PhysicalChemical => "Physical_and_Chemical_Properties",
            Section::StabilityReactivity => "Stability_and_Reactivity",
            Section::Toxicological => "Toxicological_Information",
            Section::Ecological => "Ecological_Information",
            Section::Disposal => "Disposal_Considerations",
            Section::Transport => "Transportation_Information",
            Section::Regulatory => "Regulatory_Information",
            Section::Other => "Other_Information",
        }
    }

    /// Detection patterns, tried in order. Gaps between header words are
    /// bounded so a match stays within one header on flattened text.
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            Section::Identification => &[
                r"section\s*1[:.\-\s]*identification",
                r"product\s*identification",
                r"identification\s*of\s*the\s*substance",
                r"\b1\.\s*identification",
            ],
            Section::HazardsIdentification => &[
                r"section\s*2[:.\-\s]*hazard",
                r"hazard.{0,40}?identification",
                r"classification.{0,40}?hazard",
                r"\b2\.\s*hazard",
            ],
            Section::Composition => &[
                r"section\s*3[:.\-\s]*composition",
                r"composition.{0,40}?ingredients",
                r"information.{0,40}?ingredients",
                r"\b3\.\s*composition",
            ],
            Section::FirstAid => &[
                r"section\s*4[:.\-\s]*first.{0,40}?aid",
                r"first.{0,40}?aid.{0,40}?measures",
                r"emergency.{0,40}?first.{0,40}?aid",
                r"\b4\.\s*first.{0,40}?aid",
            ],
            Section::FireFighting => &[
                r"section\s*5[:.\-\s]*fire",
                r"fire.{0,40}?fighting.{0,40}?measures",
                r"firefighting.{0,40}?measures",
                r"\b5\.\s*fire",
            ],
            Section::AccidentalRelease => &[
                r"section\s*6[:.\-\s]*accidental",
                r"accidental.{0,40}?release.{0,40}?measures",
                r"spill.{0,40}?cleanup",
                r"\b6\.\s*accidental",
            ],
            Section::HandlingStorage => &[
                r"section\s*7[:.\-\s]*handling",
                r"handling.{0,40}?storage",
                r"safe.{0,40}?handling",
                r"\b7\.\s*handling",
            ],
            Section::ExposureControls => &[
                r"section\s*8[:.\-\s]*exposure",
                r"exposure.{0,40}?controls",
                r"personal.{0,40}?protection",
                r"\b8\.\s*exposure",
            ],
            Section::PhysicalChemical => &[
                r"section\s*9[:.\-\s]*physical",
                r"physical.{0,40}?chemical.{0,40}?properties",
                r"physicochemical.{0,40}?properties",
                r"\b9\.\s*physical",
            ],
            Section::StabilityReactivity => &[
                r"section\s*10[:.\-\s]*stability",
                r"stability.{0,40}?reactivity",
                r"chemical.{0,40}?stability",
                r"\b10\.\s*stability",
            ],
            Section::Toxicological => &[
                r"section\s*11[:.\-\s]*toxicological",
                r"toxicological.{0,40}?information",
                r"health.{0,40}?effects",
                r"\b11\.\s*toxicological",
            ],
            Section::Ecological => &[
                r"section\s*12[:.\-\s]*ecological",
                r"ecological.{0,40}?information",
                r"environmental.{0,40}?effects",
                r"\b12\.\s*ecological",
            ],
            Section::Disposal => &[
                r"section\s*13[:.\-\s]*disposal",
                r"disposal.{0,40}?considerations",
                r"waste.{0,40}?disposal",
                r"\b13\.\s*disposal",
            ],
            Section::Transport => &[
                r"section\s*14[:.\-\s]*transport",
                r"transport.{0,40}?information",
                r"shipping.{0,40}?information",
                r"\b14\.\s*transport",
            ],
            Section::Regulatory => &[
                r"section\s*15[:.\-\s]*regulatory",
                r"regulatory.{0,40}?information",
                r"legal.{0,40}?information",
                r"\b15\.\s*regulatory",
            ],
            Section::Other => &[
                r"section\s*16[:.\-\s]*other",
                r"other.{0,40}?information",
                r"additional.{0,40}?information",
                r"\b16\.\s*other",
            ],
        }
    }

    /// Leading word of the section title, used to locate section headers
    /// when splitting a document into bodies.
    pub(crate) fn header_keyword(self) -> &'static str {
        match self {
            Section::Identification => "identification",
            Section::HazardsIdentification => "hazard",
            Section::Composition => "composition",
            Section::FirstAid => "first",
            Section::FireFighting => "fire",
            Section::AccidentalRelease => "accidental",
            Section::HandlingStorage => "handling",
            Section::ExposureControls => "exposure",
            Section::PhysicalChemical => "physical",
            Section::StabilityReactivity => "stability",
            Section::Toxicological => "toxicolog",
            Section::Ecological => "ecolog",
            Section::Disposal => "disposal",
            Section::Transport => "transport",
            Section::Regulatory => "regulatory",
            Section::Other => "other",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.name())
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Section", 2)?;
        state.serialize_field("section_number", &self.number())?;
        state.serialize_field("section_name", self.name())?;
        state.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionRequirements {
    pub required_sections: Vec<Section>,
    pub total_sections: usize,
}

/// The fixed sixteen-section schema every document is checked against.
pub fn section_requirements() -> SectionRequirements {
    SectionRequirements {
        required_sections: Section::ALL.to_vec(),
        total_sections: SECTION_COUNT,
    }
}
