use serde_json::Value as JsonValue;

/// One step of the transformation chain, tagged on `type`.
///
/// Step types this engine does not know deserialize into `Unsupported`; the
/// transformation stage skips them and records a note.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformationStep {
    Filter(FilterStep),
    Map(MapStep),
    Aggregate(AggregateStep),
    #[serde(other)]
    Unsupported,
}

impl TransformationStep {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::Map(_) => "map",
            Self::Aggregate(_) => "aggregate",
            Self::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterStep {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    /// Kept verbatim; filters with an unknown operator keep every element.
    Unknown(String),
}

impl From<String> for FilterOperator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            _ => Self::Unknown(s),
        }
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        match op {
            FilterOperator::Equals => "equals".to_string(),
            FilterOperator::NotEquals => "not_equals".to_string(),
            FilterOperator::Contains => "contains".to_string(),
            FilterOperator::GreaterThan => "greater_than".to_string(),
            FilterOperator::LessThan => "less_than".to_string(),
            FilterOperator::Unknown(s) => s,
        }
    }
}

/// `fields` maps each output key to the input key it is read from. Insertion
/// order is kept so mapped records (and CSV headers built from them) follow
/// the configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapStep {
    #[serde(default)]
    pub fields: serde_json::Map<String, JsonValue>,
}

impl MapStep {
    /// `(new_key, old_key)` pairs; entries whose source key is not a string are skipped.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(new_key, old_key)| old_key.as_str().map(|old| (new_key.as_str(), old)))
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AggregateStep {
    pub function: AggregateFunction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggregateFunction {
    Count,
    Sum,
    Average,
    Unsupported(String),
}

impl From<String> for AggregateFunction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "count" => Self::Count,
            "sum" => Self::Sum,
            "average" => Self::Average,
            _ => Self::Unsupported(s),
        }
    }
}

impl From<AggregateFunction> for String {
    fn from(f: AggregateFunction) -> Self {
        match f {
            AggregateFunction::Count => "count".to_string(),
            AggregateFunction::Sum => "sum".to_string(),
            AggregateFunction::Average => "average".to_string(),
            AggregateFunction::Unsupported(s) => s,
        }
    }
}
