mod file_config;

pub use file_config::{FileConfig, PaginationConfig, SearchConfig};

use crate::domain::PageDefaults;
use crate::server::{RequestsLoggingLevel, ServerConfig, DEFAULT_APP_NAME};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SearchEngine {
    #[default]
    Fts5,
    /// Search disabled: index writes are dropped and searches return nothing.
    NoOp,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub app_name: Option<String>,
    pub search_engine: SearchEngine,
    pub reindex: bool,
    pub frontend_dir_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub app_name: String,
    pub search_engine: SearchEngine,
    pub reindex: bool,
    pub frontend_dir_path: Option<String>,
    pub pagination: PageDefaults,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ, both are {}", port);
        }

        let logging_level = match file.logging_level {
            Some(level) => parse_logging_level(&level)?,
            None => cli.logging_level.clone(),
        };

        let app_name = file
            .app_name
            .or_else(|| cli.app_name.clone())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        validate_app_name(&app_name)?;

        let search_engine = match file.search.and_then(|s| s.engine) {
            Some(engine) => parse_search_engine(&engine)?,
            None => cli.search_engine,
        };

        let reindex = file.reindex.unwrap_or(cli.reindex);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let defaults = PageDefaults::default();
        let pagination_file = file.pagination.unwrap_or_default();
        let pagination = PageDefaults {
            default_size: pagination_file
                .default_size
                .unwrap_or(defaults.default_size),
            max_size: pagination_file.max_size.unwrap_or(defaults.max_size),
        };
        if pagination.default_size == 0 || pagination.default_size > pagination.max_size {
            bail!(
                "pagination.default_size must be between 1 and max_size ({}), got {}",
                pagination.max_size,
                pagination.default_size
            );
        }

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            app_name,
            search_engine,
            reindex,
            frontend_dir_path,
            pagination,
        })
    }

    pub fn primary_db_path(&self) -> PathBuf {
        self.db_dir.join("primary.db")
    }

    pub fn search_db_dir(&self) -> PathBuf {
        self.db_dir.clone()
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            app_name: self.app_name.clone(),
            pagination: self.pagination,
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }
}

fn parse_logging_level(s: &str) -> Result<RequestsLoggingLevel> {
    match RequestsLoggingLevel::from_str(s, true) {
        Ok(level) => Ok(level),
        Err(_) => bail!(
            "Unknown logging_level {:?}, expected one of: none, path, headers, body",
            s
        ),
    }
}

fn parse_search_engine(s: &str) -> Result<SearchEngine> {
    match SearchEngine::from_str(s, true) {
        Ok(engine) => Ok(engine),
        Err(_) => bail!("Unknown search engine {:?}, expected one of: fts5, no-op", s),
    }
}

/// The name ends up inside header names, so only token characters are allowed.
fn validate_app_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("app_name must not be empty");
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || *c == '.'))
    {
        bail!("app_name {:?} contains invalid character {:?}", name, c);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_temp_db_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn cli_for(dir: &TempDir) -> CliConfig {
        CliConfig {
            db_dir: Some(dir.path().to_path_buf()),
            port: 8080,
            metrics_port: 9091,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logging_level() {
        assert_eq!(
            parse_logging_level("none").unwrap(),
            RequestsLoggingLevel::None
        );
        assert_eq!(
            parse_logging_level("HEADERS").unwrap(),
            RequestsLoggingLevel::Headers
        );
        assert!(parse_logging_level("loud").is_err());
    }

    #[test]
    fn test_parse_search_engine() {
        assert_eq!(parse_search_engine("fts5").unwrap(), SearchEngine::Fts5);
        assert_eq!(parse_search_engine("no-op").unwrap(), SearchEngine::NoOp);
        assert!(parse_search_engine("elasticsearch").is_err());
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = make_temp_db_dir();
        let config = AppConfig::resolve(&cli_for(&temp_dir), None).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.port, 8080);
        assert_eq!(config.metrics_port, 9091);
        assert_eq!(config.app_name, "jhipsterApp");
        assert_eq!(config.search_engine, SearchEngine::Fts5);
        assert!(!config.reindex);
        assert_eq!(config.pagination.default_size, 20);
        assert_eq!(config.pagination.max_size, 2000);
    }

    #[test]
    fn test_resolve_file_overrides_cli() {
        let temp_dir = make_temp_db_dir();
        let mut cli = cli_for(&temp_dir);
        cli.app_name = Some("cliApp".to_string());

        let file = FileConfig {
            port: Some(3000),
            logging_level: Some("body".to_string()),
            app_name: Some("fileApp".to_string()),
            reindex: Some(true),
            search: Some(SearchConfig {
                engine: Some("no-op".to_string()),
            }),
            pagination: Some(PaginationConfig {
                default_size: Some(10),
                max_size: Some(100),
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.metrics_port, 9091);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.app_name, "fileApp");
        assert!(config.reindex);
        assert_eq!(config.search_engine, SearchEngine::NoOp);
        assert_eq!(config.pagination.default_size, 10);
        assert_eq!(config.pagination.max_size, 100);
    }

    #[test]
    fn test_resolve_missing_db_dir() {
        let cli = CliConfig::default();
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_resolve_nonexistent_db_dir() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/definitely/not/here")),
            port: 1,
            metrics_port: 2,
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_resolve_rejects_bad_values() {
        let temp_dir = make_temp_db_dir();

        let mut cli = cli_for(&temp_dir);
        cli.app_name = Some("my app".to_string());
        assert!(AppConfig::resolve(&cli, None).is_err());

        let mut cli = cli_for(&temp_dir);
        cli.metrics_port = cli.port;
        assert!(AppConfig::resolve(&cli, None).is_err());

        let file = FileConfig {
            search: Some(SearchConfig {
                engine: Some("lucene".to_string()),
            }),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli_for(&temp_dir), Some(file)).is_err());

        let file = FileConfig {
            logging_level: Some("verbose".to_string()),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli_for(&temp_dir), Some(file))
            .unwrap_err()
            .to_string();
        assert!(err.contains("logging_level"));

        let file = FileConfig {
            pagination: Some(PaginationConfig {
                default_size: Some(0),
                max_size: None,
            }),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli_for(&temp_dir), Some(file)).is_err());
    }

    #[test]
    fn test_db_path_helpers() {
        let temp_dir = make_temp_db_dir();
        let config = AppConfig::resolve(&cli_for(&temp_dir), None).unwrap();

        assert_eq!(config.primary_db_path(), temp_dir.path().join("primary.db"));
        assert_eq!(config.search_db_dir(), temp_dir.path());
    }

    #[test]
    fn test_server_config_carries_resolved_values() {
        let temp_dir = make_temp_db_dir();
        let mut cli = cli_for(&temp_dir);
        cli.frontend_dir_path = Some("/srv/web".to_string());
        let server_config = AppConfig::resolve(&cli, None).unwrap().server_config();

        assert_eq!(server_config.port, 8080);
        assert_eq!(server_config.app_name, "jhipsterApp");
        assert_eq!(server_config.frontend_dir_path.as_deref(), Some("/srv/web"));
    }
}
