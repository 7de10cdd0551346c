use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use resiply_client::{ClientConfig, HttpBackend};
use resiply_persist::{LocalStore, StorageKind, StoreBuilder};
use resiply_types::{ChatConfig, CheckoutConfig, SuggestConfig};

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: ClientConfig,
    pub storage: StorageSettings,
    pub checkout: CheckoutConfig,
    pub chat: ChatConfig,
    pub suggest: SuggestConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub kind: StorageKind,
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Settings {
    /// Load layered configuration.
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `RESIPLY_*` environment variables, `__` between nested keys
    ///    (e.g. `RESIPLY_CHECKOUT__BASE_SHIPPING_FEE=2500`)
    pub fn load() -> std::result::Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let loader = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("RESIPLY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = loader.try_deserialize()?;

        // Secret; never read from TOML.
        if let Ok(token) = std::env::var("RESIPLY_SESSION_TOKEN") {
            if !token.is_empty() {
                settings.backend.session_token = Some(token);
            }
        }

        Ok(settings)
    }

    /// Load settings from a single file (useful for testing).
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let loader = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        loader.try_deserialize()
    }

    pub fn open_store(&self) -> Result<Arc<dyn LocalStore>> {
        let mut builder = StoreBuilder::new().kind(self.storage.kind);
        if let Some(dir) = &self.storage.directory {
            if self.storage.kind == StorageKind::File {
                builder = builder.directory(dir);
            }
        }
        Ok(builder.build()?)
    }

    pub fn http_backend(&self) -> Result<Arc<HttpBackend>> {
        Ok(Arc::new(HttpBackend::new(&self.backend)?))
    }
}
