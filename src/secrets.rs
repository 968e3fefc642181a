use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DashboardError, Result};

/// Default location of the secret store, relative to the working directory.
pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";

/// Key holding the service-account credential document.
pub const SERVICE_ACCOUNT_SECRET: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Key/value secrets read from a TOML file.
#[derive(Clone, Debug, Default)]
pub struct SecretStore {
    values: toml::Table,
}

impl SecretStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            DashboardError::Auth(format!("cannot read secret store {}: {}", path.display(), e))
        })?;
        SecretStore::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let values: toml::Table = toml::from_str(text)
            .map_err(|e| DashboardError::Auth(format!("secret store is not valid TOML: {}", e)))?;
        Ok(SecretStore { values })
    }

    /// Service-account credential stored under `key`, given either as a JSON
    /// string or as an inline TOML table.
    pub fn service_account(&self, key: &str) -> Result<ServiceAccountKey> {
        let entry = self
            .values
            .get(key)
            .ok_or_else(|| DashboardError::Auth(format!("secret {} is not set", key)))?;

        let parsed = match entry {
            toml::Value::String(json) => serde_json::from_str(json),
            other => serde_json::to_value(other).and_then(serde_json::from_value),
        };
        parsed.map_err(|e| DashboardError::Auth(format!("secret {} is not a service-account document: {}", key, e)))
    }
}

/// The fields of a service-account credential the token exchange needs.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}
