//! Runtime configuration, read once at startup from `COUPONS_*` environment
//! variables and shared with handlers as `web::Data<AppConfig>`.

use crate::services::coupons::GeneratorConfig;
use std::env;
use std::path::PathBuf;

pub const HOST_VAR: &str = "COUPONS_HOST";
pub const PORT_VAR: &str = "COUPONS_PORT";
pub const TEMP_DIR_VAR: &str = "COUPONS_TEMP_DIR";
pub const OUTPUT_DIR_VAR: &str = "COUPONS_OUTPUT_DIR";
pub const FONTS_DIR_VAR: &str = "COUPONS_FONTS_DIR";
pub const ICON_PATH_VAR: &str = "COUPONS_ICON_PATH";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_FONTS_DIR: &str = "./fonts";
const DEFAULT_ICON_PATH: &str = "./assets/whatsapp_icon.png";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Root under which every request gets its own scratch directory.
    pub temp_dir: PathBuf,
    /// Icon drawn next to the helpline caption.
    pub icon_path: PathBuf,
    pub generator: GeneratorConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    /// for unset or empty values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let path_or = |key: &str, default: &str| PathBuf::from(get(key).unwrap_or_else(|| default.to_string()));

        let port = match get(PORT_VAR) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(AppConfig {
            host: get(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            temp_dir: get(TEMP_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            icon_path: path_or(ICON_PATH_VAR, DEFAULT_ICON_PATH),
            generator: GeneratorConfig {
                fonts_dir: path_or(FONTS_DIR_VAR, DEFAULT_FONTS_DIR),
                output_dir: path_or(OUTPUT_DIR_VAR, DEFAULT_OUTPUT_DIR),
            },
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
