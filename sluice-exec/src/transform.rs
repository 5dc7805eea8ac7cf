//! Ordered filter/map/aggregate steps over fetched data.
//!
//! A step that cannot run on its input leaves the data unchanged and adds a
//! note; the stage itself never fails.

use serde_json::{json, Map, Number, Value as JsonValue};
use sluice_core::types::{
    AggregateFunction, AggregateStep, FilterOperator, FilterStep, MapStep, TransformationStep,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub data: JsonValue,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("{step} step expects an array input, got {found}")]
    NotAnArray { step: &'static str, found: &'static str },
}

enum StepOutcome {
    Replaced(JsonValue),
    Skipped(String),
}

pub fn apply(steps: &[TransformationStep], data: JsonValue) -> Transformed {
    let mut data = data;
    let mut notes = Vec::new();

    for (idx, step) in steps.iter().enumerate() {
        match apply_step(step, &data) {
            Ok(StepOutcome::Replaced(next)) => data = next,
            Ok(StepOutcome::Skipped(reason)) => {
                notes.push(format!("transformation {idx} ({}) skipped: {reason}", step.kind()));
            }
            Err(e) => {
                tracing::debug!(step = idx, error = %e, "transformation left data unchanged");
                notes.push(format!("transformation {idx} ({}) skipped: {e}", step.kind()));
            }
        }
    }

    Transformed { data, notes }
}

fn apply_step(step: &TransformationStep, data: &JsonValue) -> Result<StepOutcome, TransformError> {
    match step {
        TransformationStep::Filter(filter) => {
            let items = as_array("filter", data)?;
            Ok(StepOutcome::Replaced(apply_filter(filter, items)))
        }
        TransformationStep::Map(map) => {
            let items = as_array("map", data)?;
            Ok(StepOutcome::Replaced(apply_map(map, items)))
        }
        TransformationStep::Aggregate(aggregate) => {
            let items = as_array("aggregate", data)?;
            Ok(apply_aggregate(aggregate, items))
        }
        TransformationStep::Unsupported => {
            Ok(StepOutcome::Skipped("unsupported step type".to_string()))
        }
    }
}

fn as_array<'a>(step: &'static str, data: &'a JsonValue) -> Result<&'a [JsonValue], TransformError> {
    match data {
        JsonValue::Array(items) => Ok(items),
        other => Err(TransformError::NotAnArray {
            step,
            found: kind_of(other),
        }),
    }
}

fn apply_filter(filter: &FilterStep, items: &[JsonValue]) -> JsonValue {
    items
        .iter()
        .filter(|item| {
            evaluate(
                item.get(filter.field.as_str()),
                &filter.operator,
                &filter.value,
            )
        })
        .cloned()
        .collect()
}

fn apply_map(map: &MapStep, items: &[JsonValue]) -> JsonValue {
    items
        .iter()
        .map(|item| {
            let mut out = Map::new();
            for (new_key, old_key) in map.pairs() {
                let value = item.get(old_key).cloned().unwrap_or(JsonValue::Null);
                out.insert(new_key.to_string(), value);
            }
            JsonValue::Object(out)
        })
        .collect()
}

fn apply_aggregate(aggregate: &AggregateStep, items: &[JsonValue]) -> StepOutcome {
    let field = aggregate.field.as_deref().filter(|f| !f.is_empty());
    let sum_of = |field: &str| -> f64 {
        items
            .iter()
            .map(|item| item.get(field).and_then(to_number).unwrap_or(0.0))
            .sum()
    };

    match (&aggregate.function, field) {
        (AggregateFunction::Count, _) => StepOutcome::Replaced(json!({ "count": items.len() })),
        (AggregateFunction::Sum, Some(field)) => {
            StepOutcome::Replaced(json!({ "sum": number_value(sum_of(field)) }))
        }
        (AggregateFunction::Average, Some(field)) => {
            let average = if items.is_empty() {
                JsonValue::Null
            } else {
                number_value(sum_of(field) / items.len() as f64)
            };
            StepOutcome::Replaced(json!({ "average": average }))
        }
        (AggregateFunction::Sum | AggregateFunction::Average, None) => {
            StepOutcome::Skipped("aggregate needs a field".to_string())
        }
        (AggregateFunction::Unsupported(name), _) => {
            StepOutcome::Skipped(format!("unsupported aggregate function '{name}'"))
        }
    }
}

fn evaluate(actual: Option<&JsonValue>, op: &FilterOperator, expected: &JsonValue) -> bool {
    let actual = actual.unwrap_or(&JsonValue::Null);
    match op {
        FilterOperator::Equals => loose_eq(actual, expected),
        FilterOperator::NotEquals => !loose_eq(actual, expected),
        FilterOperator::Contains => {
            !actual.is_null() && to_text(actual).contains(to_text(expected).as_str())
        }
        FilterOperator::GreaterThan => compare(actual, expected, |a, b| a > b),
        FilterOperator::LessThan => compare(actual, expected, |a, b| a < b),
        FilterOperator::Unknown(_) => true,
    }
}

/// Numbers compare numerically (a numeric string equals the number it
/// spells); everything else compares as text.
fn loose_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Null, JsonValue::Null) => true,
        (JsonValue::Null, _) | (_, JsonValue::Null) => false,
        (JsonValue::Number(_), _) | (_, JsonValue::Number(_)) => {
            match (to_number(a), to_number(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => to_text(a) == to_text(b),
    }
}

fn compare(a: &JsonValue, b: &JsonValue, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (to_number(a), to_number(b)) {
        (Some(x), Some(y)) => cmp(x, y),
        _ => false,
    }
}

fn to_number(v: &JsonValue) -> Option<f64> {
    match v {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
        _ => None,
    }
}

fn to_text(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Integral results serialize as integers, everything else as floats.
fn number_value(n: f64) -> JsonValue {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        JsonValue::from(n as i64)
    } else {
        Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

fn kind_of(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
