//! Process configuration read from the environment.

use crate::infrastructure::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::infrastructure::replicate::{DEFAULT_REPLICATE_BASE_URL, DEFAULT_REPLICATE_MODEL};

/// Default number of image URLs remembered across requests.
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 100;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 5000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the engine needs at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub replicate_api_token: String,
    pub replicate_model: String,
    pub replicate_base_url: String,
    pub image_cache_capacity: usize,
    pub cors_allowed_origins: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("replicate_model", &self.replicate_model)
            .field("replicate_base_url", &self.replicate_base_url)
            .field("image_cache_capacity", &self.image_cache_capacity)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// `GEMINI_API_KEY` and `REPLICATE_API_TOKEN` are required; everything else
    /// falls back to a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let server_port = ["SERVER_PORT", "PORT"]
            .into_iter()
            .find_map(|name| get(name).map(|raw| (name, raw)));
        let server_port = match server_port {
            Some((name, raw)) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value: raw })?,
            None => DEFAULT_SERVER_PORT,
        };

        let image_cache_capacity = match get("IMAGE_CACHE_CAPACITY") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "IMAGE_CACHE_CAPACITY",
                value: raw,
            })?,
            None => DEFAULT_IMAGE_CACHE_CAPACITY,
        };

        Ok(Self {
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.into()),
            server_port,
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
            replicate_api_token: require("REPLICATE_API_TOKEN")?,
            replicate_model: get("REPLICATE_MODEL")
                .unwrap_or_else(|| DEFAULT_REPLICATE_MODEL.into()),
            replicate_base_url: get("REPLICATE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_REPLICATE_BASE_URL.into()),
            image_cache_capacity,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        })
    }
}
