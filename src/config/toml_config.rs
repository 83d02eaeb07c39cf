use crate::core::geo::{HUB, MAX_RANGE_MILES};
use crate::core::{Coordinate, GeoGate};
use crate::utils::error::{Result, WaitlistError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub geo: GeoConfig,
    pub storage: StorageConfig,
    pub generator: GeneratorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin may call the API.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub hub_latitude: f64,
    pub hub_longitude: f64,
    pub radius_miles: f64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            hub_latitude: HUB.latitude,
            hub_longitude: HUB.longitude,
            radius_miles: MAX_RANGE_MILES,
        }
    }
}

impl GeoConfig {
    pub fn gate(&self) -> GeoGate {
        GeoGate::new(
            Coordinate::new(self.hub_latitude, self.hub_longitude),
            self.radius_miles,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: String,
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "./data/waitlist.json".to_string(),
            url: None,
            max_connections: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub max_history_messages: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            timeout_seconds: 10,
            max_history_messages: 20,
        }
    }
}

impl GeneratorConfig {
    /// The key, unless it is blank or an unresolved `${VAR}` placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WaitlistError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Like [`AppConfig::from_file`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::info!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WaitlistError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WaitlistError::ConfigError {
            message: format!("bad substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        if self.server.port == 0 {
            return Err(WaitlistError::InvalidConfigValueError {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "Port must be between 1 and 65535".to_string(),
            });
        }
        for origin in &self.server.allowed_origins {
            validate_url("server.allowed_origins", origin)?;
        }

        validate_range("geo.hub_latitude", self.geo.hub_latitude, -90.0, 90.0)?;
        validate_range("geo.hub_longitude", self.geo.hub_longitude, -180.0, 180.0)?;
        if !(self.geo.radius_miles.is_finite() && self.geo.radius_miles > 0.0) {
            return Err(WaitlistError::InvalidConfigValueError {
                field: "geo.radius_miles".to_string(),
                value: self.geo.radius_miles.to_string(),
                reason: "Radius must be a positive number of miles".to_string(),
            });
        }

        match self.storage.backend {
            StorageBackend::Memory => {}
            StorageBackend::File => validate_non_empty_string("storage.path", &self.storage.path)?,
            StorageBackend::Postgres => {
                let url = self.storage.url.as_deref().ok_or_else(|| {
                    WaitlistError::MissingConfigError {
                        field: "storage.url".to_string(),
                    }
                })?;
                validate_non_empty_string("storage.url", url)?;
                validate_positive_number("storage.max_connections", self.storage.max_connections, 1)?;
            }
        }

        validate_url("generator.endpoint", &self.generator.endpoint)?;
        validate_non_empty_string("generator.model", &self.generator.model)?;
        validate_positive_number("generator.timeout_seconds", self.generator.timeout_seconds, 1)?;
        // 0 would strip every chat turn, including the one just answered
        validate_positive_number(
            "generator.max_history_messages",
            self.generator.max_history_messages,
            1,
        )?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.geo.radius_miles, 15.0);
        assert_eq!(config.generator.model, "gemini-2.5-flash");
        assert!(config.generator.api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8080
allowed_origins = ["https://rewear.example.com"]

[geo]
hub_latitude = 42.4534
hub_longitude = -76.4735
radius_miles = 5.0

[storage]
backend = "memory"

[generator]
api_key = "abc123"
timeout_seconds = 3

[logging]
json = true
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.generator.api_key(), Some("abc123"));
        assert_eq!(config.generator.timeout_seconds, 3);
        assert!(config.logging.json);
        assert_eq!(config.geo.gate().radius_miles(), 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REWEAR_TEST_GEMINI_KEY", "from-env");

        let config = AppConfig::from_toml_str(
            r#"
[generator]
api_key = "${REWEAR_TEST_GEMINI_KEY}"
"#,
        )
        .unwrap();
        assert_eq!(config.generator.api_key(), Some("from-env"));

        std::env::remove_var("REWEAR_TEST_GEMINI_KEY");
    }

    #[test]
    fn test_unresolved_placeholder_disables_generator() {
        let config = AppConfig::from_toml_str(
            r#"
[generator]
api_key = "${REWEAR_TEST_DEFINITELY_UNSET_KEY}"
"#,
        )
        .unwrap();
        assert!(config.generator.api_key().is_none());
    }

    #[test]
    fn test_config_validation() {
        let postgres_without_url = AppConfig::from_toml_str(
            r#"
[storage]
backend = "postgres"
"#,
        )
        .unwrap();
        assert!(matches!(
            postgres_without_url.validate(),
            Err(WaitlistError::MissingConfigError { .. })
        ));

        let bad_hub = AppConfig::from_toml_str(
            r#"
[geo]
hub_latitude = 123.0
"#,
        )
        .unwrap();
        assert!(bad_hub.validate().is_err());

        let bad_radius = AppConfig::from_toml_str(
            r#"
[geo]
radius_miles = 0.0
"#,
        )
        .unwrap();
        assert!(bad_radius.validate().is_err());

        let no_history = AppConfig::from_toml_str(
            r#"
[generator]
max_history_messages = 0
"#,
        )
        .unwrap();
        assert!(matches!(
            no_history.validate(),
            Err(WaitlistError::InvalidConfigValueError { ref field, .. })
                if field == "generator.max_history_messages"
        ));

        let bad_endpoint = AppConfig::from_toml_str(
            r#"
[generator]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(bad_endpoint.validate().is_err());
    }

    #[test]
    fn test_pool_size_must_fit_u32() {
        let result = AppConfig::from_toml_str(
            r#"
[storage]
backend = "postgres"
url = "postgres://localhost/rewear"
max_connections = 5000000000
"#,
        );
        assert!(matches!(
            result,
            Err(WaitlistError::ConfigValidationError { .. })
        ));

        let zero = AppConfig::from_toml_str(
            r#"
[storage]
backend = "postgres"
url = "postgres://localhost/rewear"
max_connections = 0
"#,
        )
        .unwrap();
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_is_a_parse_error() {
        let result = AppConfig::from_toml_str(
            r#"
[storage]
backend = "mongodb"
"#,
        );
        assert!(matches!(
            result,
            Err(WaitlistError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 7070\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 7070);

        let missing = temp_file.path().with_extension("does-not-exist.toml");
        let config = AppConfig::load_or_default(missing).unwrap();
        assert_eq!(config.server.port, 5000);
    }
}
