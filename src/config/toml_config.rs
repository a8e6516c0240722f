use crate::adapters::leaflet::{MapSettings, DEFAULT_TILE_URL};
use crate::adapters::nominatim::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use crate::adapters::tiger::{DEFAULT_COUNTIES_URL, DEFAULT_DOWNLOAD_FILE};
use crate::core::geocoder::RetryPolicy;
use crate::utils::error::{MapError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_OUTPUT_FILE: &str = "fortiline_florida_map.html";

/// Run settings. Every field has a default, so an empty file (or no file) is valid.
/// The region and the branch list are fixed and deliberately not configurable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub output: OutputConfig,
    pub boundaries: BoundariesConfig,
    pub geocoding: GeocodingConfig,
    pub map: MapViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            filename: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundariesConfig {
    pub url: String,
    pub download_file: String,
    pub timeout_seconds: u64,
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COUNTIES_URL.to_string(),
            download_file: DEFAULT_DOWNLOAD_FILE.to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub max_attempts: u32,
    pub timeout_seconds: u64,
    pub backoff_base_ms: u64,
    pub not_found_delay_ms: u64,
    pub request_interval_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: 3,
            timeout_seconds: 10,
            backoff_base_ms: 1000,
            not_found_delay_ms: 1000,
            request_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    pub zoom_start: u8,
    pub tile_url: String,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            zoom_start: 7,
            tile_url: DEFAULT_TILE_URL.to_string(),
        }
    }
}

impl MapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MapError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NOMINATIM_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| MapError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.geocoding.max_attempts,
            backoff_base: Duration::from_millis(self.geocoding.backoff_base_ms),
            not_found_delay: Duration::from_millis(self.geocoding.not_found_delay_ms),
            request_timeout: Duration::from_secs(self.geocoding.timeout_seconds),
            request_interval: Duration::from_millis(self.geocoding.request_interval_ms),
        }
    }

    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            zoom_start: self.map.zoom_start,
            tile_url: self.map.tile_url.clone(),
            ..MapSettings::default()
        }
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.boundaries.timeout_seconds)
    }

    /// The intermediate archive lives next to the output and is removed after reading.
    pub fn download_path(&self) -> PathBuf {
        Path::new(&self.output.directory).join(&self.boundaries.download_file)
    }
}

impl Validate for MapConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output.directory", &self.output.directory)?;
        validation::validate_file_name("output.filename", &self.output.filename)?;

        validation::validate_url("boundaries.url", &self.boundaries.url)?;
        validation::validate_file_name("boundaries.download_file", &self.boundaries.download_file)?;
        validation::validate_positive_number(
            "boundaries.timeout_seconds",
            self.boundaries.timeout_seconds,
            1,
        )?;

        validation::validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;
        validation::validate_non_empty_string("geocoding.user_agent", &self.geocoding.user_agent)?;
        validation::validate_range("geocoding.max_attempts", self.geocoding.max_attempts, 1, 10)?;
        validation::validate_positive_number(
            "geocoding.timeout_seconds",
            self.geocoding.timeout_seconds,
            1,
        )?;
        // Nominatim 的使用政策：每秒最多一個請求
        validation::validate_positive_number(
            "geocoding.request_interval_ms",
            self.geocoding.request_interval_ms,
            1000,
        )?;

        validation::validate_range("map.zoom_start", self.map.zoom_start, 1, 18)?;
        validation::validate_non_empty_string("map.tile_url", &self.map.tile_url)?;

        if self.download_path() == Path::new(&self.output.directory).join(&self.output.filename) {
            return Err(MapError::InvalidConfigValueError {
                field: "boundaries.download_file".to_string(),
                value: self.boundaries.download_file.clone(),
                reason: "must differ from output.filename".to_string(),
            });
        }

        Ok(())
    }
}
