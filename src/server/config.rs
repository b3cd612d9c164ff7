use super::RequestsLoggingLevel;
use crate::domain::PageDefaults;

pub const DEFAULT_APP_NAME: &str = "jhipsterApp";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Prefix of the alert headers, e.g. `X-jhipsterApp-alert`.
    pub app_name: String,
    pub pagination: PageDefaults,
    pub frontend_dir_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8080,
            metrics_port: 9091,
            app_name: DEFAULT_APP_NAME.to_string(),
            pagination: PageDefaults::default(),
            frontend_dir_path: None,
        }
    }
}
