use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::PathError;
use crate::path::{navigate_indexed, ArrayCrossing};

/// Re-renders `base` with `segment[index]` wherever the accumulated prefix
/// has a selection. Selections are not checked against any data.
pub fn render_indexed_path(base: &str, selections: &BTreeMap<String, usize>) -> String {
    if base.is_empty() {
        return String::new();
    }

    let mut prefix = String::with_capacity(base.len());
    let mut rendered = Vec::new();
    for (level, segment) in base.split('.').enumerate() {
        if level > 0 {
            prefix.push('.');
        }
        prefix.push_str(segment);
        match selections.get(&prefix) {
            Some(index) => rendered.push(format!("{segment}[{index}]")),
            None => rendered.push(segment.to_string()),
        }
    }
    rendered.join(".")
}

/// A base path plus the index chosen at each array prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPath {
    pub base: String,
    #[serde(default)]
    pub selections: BTreeMap<String, usize>,
}

impl IndexedPath {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            selections: BTreeMap::new(),
        }
    }

    pub fn select(mut self, prefix: impl Into<String>, index: usize) -> Self {
        self.selections.insert(prefix.into(), index);
        self
    }

    /// Selects index 0 at every crossing.
    pub fn from_crossings(base: impl Into<String>, crossings: &[ArrayCrossing]) -> Self {
        Self {
            base: base.into(),
            selections: crossings
                .iter()
                .map(|c| (c.full_path.clone(), 0))
                .collect(),
        }
    }

    pub fn render(&self) -> String {
        render_indexed_path(&self.base, &self.selections)
    }

    pub fn resolve<'v>(&self, value: &'v JsonValue) -> Result<Option<&'v JsonValue>, PathError> {
        navigate_indexed(value, &self.render())
    }
}

impl fmt::Display for IndexedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
