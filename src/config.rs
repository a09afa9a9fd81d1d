//! Configuration management for the RAX file store
//!
//! Settings come from built-in defaults, an optional `config.toml` and
//! `RAX_STORE_*` environment overrides, in that order of precedence.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_STORE_ROOT: &str = "./uploads";
const DEFAULT_AUDIT_LOG_PATH: &str = "./logs.json";
const DEFAULT_CATEGORIES: [&str; 3] = ["images", "videos", "other"];
const DEFAULT_CATEGORY: &str = "other";
const DEFAULT_AUDIT_CAPACITY: usize = 500;
const DEFAULT_MAX_UPLOAD_FILES: usize = 50;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;

/// Complete server configuration, loaded once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    // ═══ NETWORK ═══
    /// IP address the HTTP listener binds to
    pub bind_address: String,

    /// Port for the HTTP listener (0 picks an ephemeral port)
    pub port: u16,

    // ═══ STORAGE LAYOUT ═══
    /// Root directory holding one subdirectory per category
    pub store_root: String,

    /// Location of the process-wide audit artifact
    pub audit_log_path: String,

    /// Fixed set of top-level categories
    pub categories: Vec<String>,

    /// Category used by uploads that do not name one
    pub default_category: String,

    // ═══ LIMITS ═══
    /// Maximum number of retained audit records
    pub audit_capacity: usize,

    /// Maximum files accepted by a single upload request
    pub max_upload_files: usize,

    /// Maximum size of a single uploaded file in MB
    pub max_file_size_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            store_root: DEFAULT_STORE_ROOT.to_string(),
            audit_log_path: DEFAULT_AUDIT_LOG_PATH.to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            default_category: DEFAULT_CATEGORY.to_string(),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            max_upload_files: DEFAULT_MAX_UPLOAD_FILES,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        // Try the packaged path first, then the development path
        let config_paths = ["rax-file-store/config", "config"];

        let mut builder = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("store_root", DEFAULT_STORE_ROOT)?
            .set_default("audit_log_path", DEFAULT_AUDIT_LOG_PATH)?
            .set_default("categories", DEFAULT_CATEGORIES.to_vec())?
            .set_default("default_category", DEFAULT_CATEGORY)?
            .set_default("audit_capacity", DEFAULT_AUDIT_CAPACITY as i64)?
            .set_default("max_upload_files", DEFAULT_MAX_UPLOAD_FILES as i64)?
            .set_default("max_file_size_mb", DEFAULT_MAX_FILE_SIZE_MB as i64)?;

        for config_path in config_paths {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("RAX_STORE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("categories"),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_root.is_empty() {
            return Err(ConfigError::Message("store_root cannot be empty".into()));
        }

        if self.audit_log_path.is_empty() {
            return Err(ConfigError::Message(
                "audit_log_path cannot be empty".into(),
            ));
        }

        if self.categories.is_empty() {
            return Err(ConfigError::Message(
                "at least one category must be configured".into(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !is_plain_segment(category) {
                return Err(ConfigError::Message(format!(
                    "category {category:?} must be a single plain path segment"
                )));
            }
            if !seen.insert(category.as_str()) {
                return Err(ConfigError::Message(format!(
                    "category {category:?} is configured twice"
                )));
            }
        }

        if !seen.contains(self.default_category.as_str()) {
            return Err(ConfigError::Message(format!(
                "default_category {:?} is not one of the configured categories",
                self.default_category
            )));
        }

        if self.audit_capacity == 0 {
            return Err(ConfigError::Message(
                "audit_capacity must be greater than 0".into(),
            ));
        }

        if self.max_upload_files == 0 {
            return Err(ConfigError::Message(
                "max_upload_files must be greater than 0".into(),
            ));
        }

        if self.max_file_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_file_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get store root as PathBuf
    pub fn store_root_path(&self) -> PathBuf {
        PathBuf::from(&self.store_root)
    }

    /// Get audit artifact location as PathBuf
    pub fn audit_log_file(&self) -> PathBuf {
        PathBuf::from(&self.audit_log_path)
    }

    /// Get maximum file size in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Upper bound for one upload request body, with headroom for multipart framing
    pub fn max_request_body_bytes(&self) -> usize {
        let files = self.max_upload_files as u64;
        let bytes = self.max_file_size_bytes().saturating_mul(files).saturating_add(1024 * 1024);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }
}

fn is_plain_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_socket(), "127.0.0.1:5000");
        assert_eq!(config.max_file_size_bytes(), 100 * 1024 * 1024);
    }

    #[test]
    fn test_rejects_default_category_outside_set() {
        let config = ServerConfig {
            default_category: "music".into(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_traversal_category() {
        let config = ServerConfig {
            categories: vec!["images".into(), "..".into()],
            default_category: "images".into(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let config = ServerConfig {
            categories: vec!["images".into(), "images".into()],
            default_category: "images".into(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_limits() {
        let config = ServerConfig {
            audit_capacity: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
