use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::staffing::{FormulaVariant, DEFAULT_COMPLEXITY, DEFAULT_MANAGER_TO_CLIENT_RATIO};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub staffing: StaffingConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffingConfig {
    #[serde(default)]
    pub variant: FormulaVariant,
    #[serde(default = "default_complexity")]
    pub default_complexity: i64,
    #[serde(default = "default_manager_to_client_ratio")]
    pub default_manager_to_client_ratio: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default = "default_admins")]
    pub admins: Vec<String>,
    #[serde(default)]
    pub open_access: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<String>,
    pub variant: Option<FormulaVariant>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/staffing-planner/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(db_path) = overrides.db_path {
            self.storage.db_path = db_path;
        }
        if let Some(variant) = overrides.variant {
            self.staffing.variant = variant;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn default_template() -> String {
        let template = r#"[storage]
db_path = "~/.local/share/staffing-planner/planner.db"

[staffing]
# "simple" uses work-order volume only.
# "ratio_aware" also scales by complexity, counts complaints and applies
# the manager-to-client ratio to leadership.
variant = "simple"
default_complexity = 1
default_manager_to_client_ratio = 3

[access]
admins = ["admin"]
open_access = false

[server]
host = "127.0.0.1"
port = 3001

[logging]
filter = "info"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for StaffingConfig {
    fn default() -> Self {
        Self {
            variant: FormulaVariant::default(),
            default_complexity: default_complexity(),
            default_manager_to_client_ratio: default_manager_to_client_ratio(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admins: default_admins(),
            open_access: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_db_path() -> String {
    "~/.local/share/staffing-planner/planner.db".to_string()
}

fn default_complexity() -> i64 {
    DEFAULT_COMPLEXITY
}

fn default_manager_to_client_ratio() -> i64 {
    DEFAULT_MANAGER_TO_CLIENT_RATIO
}

fn default_admins() -> Vec<String> {
    vec!["admin".to_string()]
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).unwrap();
        assert_eq!(parsed.staffing.variant, FormulaVariant::Simple);
        assert_eq!(parsed.staffing.default_manager_to_client_ratio, 3);
        assert_eq!(parsed.server.port, 3001);
        assert_eq!(parsed.access.admins, vec!["admin".to_string()]);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[staffing]\nvariant = \"ratio_aware\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.staffing.variant, FormulaVariant::RatioAware);
        assert_eq!(config.staffing.default_complexity, 1);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn write_template_then_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        Config::write_template(&path).unwrap();
        let mut config = Config::load(Some(&path)).unwrap();
        config.apply_overrides(ConfigOverrides {
            db_path: Some("/tmp/planner.db".to_string()),
            variant: Some(FormulaVariant::RatioAware),
        });
        assert_eq!(config.resolved_db_path(), PathBuf::from("/tmp/planner.db"));
        assert_eq!(config.staffing.variant, FormulaVariant::RatioAware);
    }
}
