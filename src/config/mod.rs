#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::TableSpec;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whole-job configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub mongo: MongoConfig,
    pub mysql: MysqlConfig,
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MongoConfig {
    #[serde(default = "default_mongo_host")]
    pub host: String,
    #[serde(default = "default_mongo_port")]
    pub port: u16,
    pub db: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MysqlConfig {
    pub login_path: String,
    #[serde(default)]
    pub db: String,
}

fn default_mongo_host() -> String {
    "localhost".to_string()
}

fn default_mongo_port() -> u16 {
    27017
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") | None => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some(other) => Err(EtlError::InvalidConfigValueError {
                field: "config".to_string(),
                value: path.display().to_string(),
                reason: format!("Unsupported config extension `{}`; use .yaml, .yml or .toml", other),
            }),
        }
    }
}

impl AppConfig {
    /// Loads a YAML (`.yaml`/`.yml`) or TOML (`.toml`) configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        match format {
            ConfigFormat::Yaml => Self::from_yaml_str(&content),
            ConfigFormat::Toml => Self::from_toml_str(&content),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content)?;
        Ok(toml::from_str(&content)?)
    }

    /// Tables to migrate, in configuration order. An empty `names` selects
    /// every table; otherwise each name must match a `mongo_name`.
    pub fn select_tables(&self, names: &[String]) -> Result<Vec<TableSpec>> {
        if names.is_empty() {
            return Ok(self.tables.clone());
        }

        if let Some(unknown) = names
            .iter()
            .find(|name| !self.tables.iter().any(|t| &t.mongo_name == *name))
        {
            return Err(EtlError::InvalidConfigValueError {
                field: "table".to_string(),
                value: unknown.clone(),
                reason: "No table with this mongo_name in the configuration".to_string(),
            });
        }

        Ok(self
            .tables
            .iter()
            .filter(|t| names.contains(&t.mongo_name))
            .cloned()
            .collect())
    }
}

/// Replaces `${VAR}` with the environment value. Unknown variables are left
/// untouched.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
        message: format!("env substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

impl Validate for TableSpec {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("tables.mongo_name", &self.mongo_name)?;
        validate_non_empty_string("tables.mysql_name", &self.mysql_name)?;
        if self.fields.is_empty() {
            return Err(EtlError::ConfigValidationError {
                field: format!("tables[{}].fields", self.mongo_name),
                message: "At least one field is required".to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("mongo.host", &self.mongo.host)?;
        validate_range("mongo.port", self.mongo.port, 1, u16::MAX)?;
        validate_non_empty_string("mongo.db", &self.mongo.db)?;
        validate_non_empty_string("mysql.login_path", &self.mysql.login_path)?;
        if self.mysql.db.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "mysql.db".to_string(),
            });
        }
        validate_non_empty_string("mysql.db", &self.mysql.db)?;
        validate_positive_number("tables", self.tables.len(), 1)?;
        for table in &self.tables {
            table.validate()?;
        }
        Ok(())
    }
}
