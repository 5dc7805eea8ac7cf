use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::SourceSpecError;

/// A data source as supplied by the caller. `config` stays untyped until
/// [`SourceDescriptor::spec`] resolves it against `type`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub source_type: String,

    #[serde(default)]
    pub config: JsonValue,
}

impl SourceDescriptor {
    /// Slot in the merged result bag: `id`, falling back to `name`.
    pub fn key(&self) -> &str {
        match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => &self.name,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.key()
        } else {
            &self.name
        }
    }

    pub fn spec(&self) -> Result<SourceSpec, SourceSpecError> {
        let source_type = SourceType::parse(&self.source_type)
            .ok_or_else(|| SourceSpecError::UnknownType(self.source_type.clone()))?;
        Ok(match source_type {
            SourceType::Api => SourceSpec::Api(typed_config(source_type, &self.config)?),
            SourceType::Database => SourceSpec::Database(typed_config(source_type, &self.config)?),
            SourceType::Rss => SourceSpec::Rss(typed_config(source_type, &self.config)?),
            SourceType::File => SourceSpec::File(typed_config(source_type, &self.config)?),
        })
    }
}

fn typed_config<T: DeserializeOwned>(
    source_type: SourceType,
    config: &JsonValue,
) -> Result<T, SourceSpecError> {
    let config = match config {
        JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(config).map_err(|e| SourceSpecError::InvalidConfig {
        source_type: source_type.as_str(),
        message: e.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Api,
    Database,
    Rss,
    File,
}

impl SourceType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Some(Self::Api),
            "database" => Some(Self::Database),
            "rss" => Some(Self::Rss),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Database => "database",
            Self::Rss => "rss",
            Self::File => "file",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    Api(ApiSource),
    Database(DatabaseSource),
    Rss(RssSource),
    File(FileSource),
}

impl SourceSpec {
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Api(_) => SourceType::Api,
            Self::Database(_) => SourceType::Database,
            Self::Rss(_) => SourceType::Rss,
            Self::File(_) => SourceType::File,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Dotted path into the response. Indexed segments (`items[0]`) are
    /// accepted; any other `[` fails validation, and an index applied to a
    /// non-array fails the source. Missing keys select `null`.
    #[serde(default, alias = "data_path", skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
}

/// The connection descriptor is opaque to the engine and handed as-is to the
/// database collaborator.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DatabaseSource {
    #[serde(default)]
    pub connection: JsonValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RssSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, alias = "normalize_text")]
    pub normalize_text: bool,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub format: FileFormat,
}

/// Anything other than `json` or `csv` is read as plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileFormat {
    Json,
    Csv,
    #[default]
    Text,
}

impl From<String> for FileFormat {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "csv" => Self::Csv,
            _ => Self::Text,
        }
    }
}

impl From<FileFormat> for String {
    fn from(f: FileFormat) -> Self {
        match f {
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
            FileFormat::Text => "text",
        }
        .to_string()
    }
}
