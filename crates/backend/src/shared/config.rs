use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    /// Directory for uploaded images, served under `/uploads`
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    /// Largest accepted image file
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

/// Image parts one form may carry (logo and favicon)
const MAX_FILES_PER_FORM: usize = 2;

/// Room for text parts and multipart framing
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

impl UploadsConfig {
    /// Body limit of the multipart upload routes
    pub fn body_limit(&self) -> usize {
        self.max_bytes
            .saturating_mul(MAX_FILES_PER_FORM)
            .saturating_add(FORM_OVERHEAD_BYTES)
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: u64,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_uploads_dir() -> String {
    "target/uploads".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_per_page() -> u64 {
    contracts::shared::pagination::DEFAULT_PER_PAGE
}

fn default_max_per_page() -> u64 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
            max_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl PaginationConfig {
    /// Clamp a requested page size into `[1, max_per_page]`
    pub fn clamp_per_page(&self, requested: u64) -> u64 {
        requested.clamp(1, self.max_per_page.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "target/db/app.db".to_string(),
            },
            server: ServerConfig::default(),
            uploads: UploadsConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
port = 3000

[uploads]
dir = "target/uploads"
max_bytes = 10485760

[pagination]
default_per_page = 10
max_per_page = 100
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Make the loaded configuration available to handlers
pub fn install(config: Config) -> anyhow::Result<()> {
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Configuration is already installed"))
}

/// Installed configuration (defaults if `install` was never called)
pub fn current() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Resolve a configured path: absolute paths are used as is, relative ones
/// are taken relative to the executable directory
pub fn resolve_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(configured)
}

/// Get the database file path from configuration
pub fn get_database_path(config: &Config) -> PathBuf {
    resolve_path(&config.database.path)
}

/// Get the uploads directory from configuration
pub fn get_uploads_dir(config: &Config) -> PathBuf {
    resolve_path(&config.uploads.dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.pagination.default_per_page, 10);
        assert_eq!(config.pagination.max_per_page, 100);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[database]\npath = \"/var/lib/jewel/app.db\"\n").unwrap();
        assert_eq!(config.uploads.dir, "target/uploads");
        assert_eq!(config.uploads.max_bytes, 10 * 1024 * 1024);
        assert!(config.uploads.body_limit() > 2 * config.uploads.max_bytes);
        assert_eq!(config.pagination.max_per_page, 100);
        assert_eq!(
            get_database_path(&config),
            PathBuf::from("/var/lib/jewel/app.db")
        );
    }

    #[test]
    fn test_per_page_is_clamped() {
        let pagination = PaginationConfig {
            default_per_page: 10,
            max_per_page: 50,
        };
        assert_eq!(pagination.clamp_per_page(0), 1);
        assert_eq!(pagination.clamp_per_page(25), 25);
        assert_eq!(pagination.clamp_per_page(500), 50);
    }
}
