#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
    Rss,
    Csv,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "rss" => Some(Self::Rss),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Rss => "rss",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Rss => "application/rss+xml",
            Self::Csv => "text/csv",
        }
    }
}

/// Channel metadata for RSS output.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeedMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub format: OutputFormat,
    pub metadata: FeedMetadata,
}

impl OutputSpec {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            metadata: FeedMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: FeedMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Resolves a requested format name. Unknown names fall back to JSON and
    /// return a note describing the fallback.
    pub fn resolve(requested: Option<&str>, metadata: FeedMetadata) -> (Self, Option<String>) {
        match requested {
            None => (Self::new(OutputFormat::Json).with_metadata(metadata), None),
            Some(name) => match OutputFormat::parse(name) {
                Some(format) => (Self::new(format).with_metadata(metadata), None),
                None => (
                    Self::new(OutputFormat::Json).with_metadata(metadata),
                    Some(format!("unsupported output format '{name}', falling back to json")),
                ),
            },
        }
    }
}
