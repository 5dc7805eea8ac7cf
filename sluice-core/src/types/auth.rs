use secrecy::SecretString;
use serde::Deserialize;

/// Per-endpoint authorization policy, tagged on `type`.
#[derive(Debug, Default, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EndpointAuthConfig {
    #[default]
    None,
    ApiKey {
        #[serde(default, alias = "headerName")]
        header_name: Option<String>,
    },
    Bearer,
    Basic {
        username: String,
        #[serde(deserialize_with = "deserialize_secret")]
        password: SecretString,
    },
}

impl EndpointAuthConfig {
    pub const DEFAULT_API_KEY_HEADER: &'static str = "x-api-key";

    pub fn auth_type(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ApiKey { .. } => "api-key",
            Self::Bearer => "bearer",
            Self::Basic { .. } => "basic",
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}
