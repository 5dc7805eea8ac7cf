use serde_json::Value as JsonValue;

/// A point along a path where traversal passes through an array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayCrossing {
    /// Zero-based segment index.
    pub level: usize,
    pub field_name: String,
    pub array_length: usize,
    /// Dotted path up to and including this segment.
    pub full_path: String,
}

/// Walks `path` against `sample` and reports every array crossed on the way.
///
/// After an array the walk continues through its first element. An empty
/// array or a missing key ends the walk without error; whatever was found up
/// to that point is returned.
pub fn analyze_array_crossings(path: &str, sample: &JsonValue) -> Vec<ArrayCrossing> {
    let mut crossings = Vec::new();
    if path.is_empty() || sample.is_null() {
        return crossings;
    }

    let mut current = sample;
    let mut prefix = String::with_capacity(path.len());
    for (level, segment) in path.split('.').enumerate() {
        if level > 0 {
            prefix.push('.');
        }
        prefix.push_str(segment);

        let Some(next) = current.get(segment) else {
            break;
        };

        match next {
            JsonValue::Array(items) => {
                crossings.push(ArrayCrossing {
                    level,
                    field_name: segment.to_string(),
                    array_length: items.len(),
                    full_path: prefix.clone(),
                });
                match items.first() {
                    Some(first) => current = first,
                    None => break,
                }
            }
            other => current = other,
        }
    }

    crossings
}
