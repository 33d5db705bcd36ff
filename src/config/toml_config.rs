use crate::core::row::{RowDecoder, DEFAULT_CODE_FIELD, DEFAULT_QUANTITY_FIELD};
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub source: SourceConfig,
    pub columns: ColumnConfig,
    pub store: StoreConfig,
    pub dispatch: DispatchConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory that spreadsheet locators are resolved against.
    pub base_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_path: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub product_code: String,
    pub quantity: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            product_code: DEFAULT_CODE_FIELD.to_string(),
            quantity: DEFAULT_QUANTITY_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory,
    JsonFile { path: String },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::JsonFile {
            path: "./products.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchConfig {
    Memory,
    JsonLines {
        path: String,
    },
    Http {
        endpoint: String,
        timeout_seconds: Option<u64>,
    },
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig::JsonLines {
            path: "./image-queue.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl ImportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${QUEUE_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("source.base_path", &self.source.base_path)?;
        validation::validate_non_empty_string("columns.product_code", &self.columns.product_code)?;
        validation::validate_non_empty_string("columns.quantity", &self.columns.quantity)?;

        if self.columns.product_code == self.columns.quantity {
            return Err(ImportError::ConfigValidationError {
                field: "columns".to_string(),
                message: "product_code and quantity must name different columns".to_string(),
            });
        }

        if let StoreConfig::JsonFile { path } = &self.store {
            validation::validate_path("store.path", path)?;
        }

        match &self.dispatch {
            DispatchConfig::Memory => {}
            DispatchConfig::JsonLines { path } => {
                validation::validate_path("dispatch.path", path)?;
            }
            DispatchConfig::Http {
                endpoint,
                timeout_seconds,
            } => {
                validation::validate_url("dispatch.endpoint", endpoint)?;
                if let Some(timeout) = timeout_seconds {
                    validation::validate_min("dispatch.timeout_seconds", *timeout, 1)?;
                }
            }
        }

        if let Some(level) = self.log_level() {
            validation::validate_one_of("logging.level", level, &LOG_LEVELS)?;
        }
        if let Some(format) = self.log_format() {
            validation::validate_one_of("logging.format", format, &LOG_FORMATS)?;
        }

        Ok(())
    }

    pub fn decoder(&self) -> RowDecoder {
        RowDecoder::new(&self.columns.product_code, &self.columns.quantity)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn log_format(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.format.as_deref())
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
