// Wire types for the extraction backend response
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-field confidence report as the backend ships it. The backend has
/// already bucketed `field_count`; the client only presents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidenceReport {
    #[serde(default)]
    pub overall_confidence: f64,
    #[serde(default)]
    pub field_count: FieldCount,
    #[serde(default)]
    pub low_confidence_fields: Vec<LowConfidenceField>,
    #[serde(default)]
    pub validation_warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FieldCount {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub high_confidence: u32,
    #[serde(default)]
    pub medium_confidence: u32,
    #[serde(default)]
    pub low_confidence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowConfidenceField {
    pub field: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Generated output files, downloadable one by one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputFiles {
    #[serde(default)]
    pub csv_files: Vec<String>,
    #[serde(default)]
    pub count: u32,
}

/// Structured records extracted from a declaration form: person-like,
/// position-like, asset-like and statement-like groups. Every field is
/// defaulted so a partially filled response still decodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub submitter: Option<Person>,
    #[serde(default)]
    pub spouse: Option<Person>,
    #[serde(default)]
    pub relatives: Vec<Person>,
    #[serde(default)]
    pub submitter_positions: Vec<Position>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Declaration {
    pub fn is_empty(&self) -> bool {
        self.submitter.is_none()
            && self.spouse.is_none()
            && self.relatives.is_empty()
            && self.submitter_positions.is_empty()
            && self.assets.is_empty()
            && self.statements.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub relationship_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub position_name: String,
    #[serde(default)]
    pub position_start_year: String,
    #[serde(default)]
    pub position_start_month: String,
    #[serde(default)]
    pub position_start_date: String,
    #[serde(default)]
    pub position_ending_year: String,
    #[serde(default)]
    pub position_ending_month: String,
    #[serde(default)]
    pub position_ending_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub asset_type_id: Option<i64>,
    #[serde(default)]
    pub asset_name: String,
    #[serde(default)]
    pub valuation: Option<f64>,
    #[serde(default)]
    pub acquiring_year: String,
    #[serde(default)]
    pub acquiring_month: String,
    #[serde(default)]
    pub acquiring_date: String,
    #[serde(flatten)]
    pub owners: Ownership,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub statement_type_id: Option<i64>,
    #[serde(default)]
    pub statement_name: String,
    #[serde(default)]
    pub valuation: Option<f64>,
    #[serde(flatten)]
    pub owners: Ownership,
}

/// Which of the fixed declaration roles an item is attributed to.
/// Joint ownership sets more than one flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Ownership {
    #[serde(default)]
    pub owner_by_submitter: bool,
    #[serde(default)]
    pub owner_by_spouse: bool,
    #[serde(default)]
    pub owner_by_child: bool,
}

impl Ownership {
    /// Role labels joined for display, e.g. "submitter, spouse"
    pub fn labels(&self) -> String {
        let mut roles = Vec::new();
        if self.owner_by_submitter {
            roles.push("submitter");
        }
        if self.owner_by_spouse {
            roles.push("spouse");
        }
        if self.owner_by_child {
            roles.push("child");
        }
        roles.join(", ")
    }
}

/// A decoded backend response. Each section is optional and decoded
/// independently: a missing or malformed section is simply absent.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub message: Option<String>,
    pub confidence: Option<ConfidenceReport>,
    pub output: Option<OutputFiles>,
    pub data: Option<Declaration>,
}

impl ExtractionResult {
    /// Fail-soft decoding: shape deviations in one section never poison
    /// the others.
    pub fn from_value(value: Value) -> Self {
        let section = |key: &str| value.get(key).cloned();
        Self {
            message: section("message").and_then(|v| v.as_str().map(str::to_owned)),
            confidence: section("confidence")
                .and_then(|v| serde_json::from_value(v).ok()),
            output: section("output").and_then(|v| serde_json::from_value(v).ok()),
            data: section("data").and_then(|v| serde_json::from_value(v).ok()),
        }
    }
}
