use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub google_client_id: String,
    /// Public base URL of this service, used for upload and image URLs.
    pub deployment_url: String,
    /// Front-end origin allowed to call the API.
    pub site_url: String,
    /// Unset keeps everything in memory.
    pub database_url: Option<String>,
    pub storage_folder: String,
    pub max_upload_bytes: u64,
    pub upload_url_ttl_secs: u64,
    pub session_max_age_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("deployment_url", "http://localhost:8000")?
            .set_default("site_url", "http://localhost:3000")?
            .set_default("storage_folder", "runtime/storage")?
            .set_default("max_upload_bytes", 10 * 1024 * 1024)?
            .set_default("upload_url_ttl_secs", 60 * 60)?
            .set_default("session_max_age_secs", 60 * 60 * 24 * 30)
    }

    /// Absolute URL of an API path, e.g. `api_url("things")`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v1/{}",
            self.deployment_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn storage_url(&self, storage_id: &str) -> String {
        self.api_url(&format!("storage/{}", storage_id))
    }
}
