use serde_json::Value as JsonValue;

use crate::error::PathError;
use crate::path::parse_indexed_path;

/// Plain dotted traversal. Any missing segment yields `None`.
///
/// A numeric segment applied to an array selects that element, the same way
/// key lookup on an array behaves in loosely typed payload code.
pub fn navigate<'v>(value: &'v JsonValue, path: &str) -> Option<&'v JsonValue> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, step)
}

/// Traversal that also honors `segment[N]`.
///
/// Missing keys and out-of-range indices yield `Ok(None)`. Selecting an index
/// on something that is not an array is an error, since that means the
/// indexed path was rendered against differently shaped data.
pub fn navigate_indexed<'v>(
    value: &'v JsonValue,
    path: &str,
) -> Result<Option<&'v JsonValue>, PathError> {
    let segments = parse_indexed_path(path)?;

    let mut current = value;
    let mut prefix = String::with_capacity(path.len());
    for (level, segment) in segments.iter().enumerate() {
        if level > 0 {
            prefix.push('.');
        }
        prefix.push_str(segment.name);

        let Some(next) = step(current, segment.name) else {
            return Ok(None);
        };
        current = match segment.index {
            None => next,
            Some(index) => match next {
                JsonValue::Array(items) => match items.get(index) {
                    Some(item) => item,
                    None => return Ok(None),
                },
                _ => {
                    return Err(PathError::NotAnArray {
                        prefix: prefix.clone(),
                    })
                }
            },
        };
    }
    Ok(Some(current))
}

fn step<'v>(current: &'v JsonValue, segment: &str) -> Option<&'v JsonValue> {
    match current {
        JsonValue::Object(map) => map.get(segment),
        JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
