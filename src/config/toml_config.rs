use crate::core::registry::{resolve, AdapterOptions};
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub data_source: DataSourceSection,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceSection {
    /// Adapter name or alias, e.g. `rest` or `pg`.
    pub adapter: String,
    #[serde(default)]
    pub options: toml::Table,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl DataSourceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdapterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdapterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_HOST})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdapterError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn adapter_name(&self) -> &str {
        &self.data_source.adapter
    }

    /// Options table as the JSON object handed to the adapter factory.
    pub fn adapter_options(&self) -> Result<AdapterOptions> {
        match serde_json::to_value(&self.data_source.options)? {
            serde_json::Value::Object(options) => Ok(options),
            _ => Ok(AdapterOptions::new()),
        }
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for DataSourceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("data_source.adapter", &self.data_source.adapter)?;

        if resolve(&self.data_source.adapter).is_none() {
            return Err(AdapterError::UnknownAdapter {
                name: self.data_source.adapter.clone(),
            });
        }

        Ok(())
    }
}
