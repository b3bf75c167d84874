use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sinks: SinkConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            sinks: SinkConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Endpoints and credentials for the three outbound sinks.
///
/// A missing credential is not a load error; the affected sink surfaces it as
/// an immediate failure at send time while the other sinks stay usable.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub sheets: SheetsSinkConfig,
    pub email: EmailSinkConfig,
    pub record_store: RecordStoreSinkConfig,
}

impl SinkConfig {
    fn from_env() -> Self {
        Self {
            sheets: SheetsSinkConfig {
                webhook_url: env::var("SHEETS_WEBHOOK_URL").ok(),
            },
            email: EmailSinkConfig {
                service_url: env::var("EMAIL_SERVICE_URL")
                    .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
                api_key: env::var("EMAIL_API_KEY").ok(),
                notification_email: env::var("NOTIFICATION_EMAIL")
                    .unwrap_or_else(|_| "screening-team@example.com".to_string()),
                from_email: env::var("FROM_EMAIL")
                    .unwrap_or_else(|_| "noreply@screening.example.com".to_string()),
            },
            record_store: RecordStoreSinkConfig {
                base_url: env::var("RECORD_STORE_BASE_URL").ok(),
                api_key: env::var("RECORD_STORE_API_KEY").ok(),
                table: env::var("RECORD_STORE_TABLE")
                    .unwrap_or_else(|_| "Consultations".to_string()),
            },
        }
    }
}

/// Spreadsheet webhook endpoint; the URL carries its own credential.
#[derive(Debug, Clone)]
pub struct SheetsSinkConfig {
    pub webhook_url: Option<String>,
}

/// Email notification service endpoint and addressing.
#[derive(Debug, Clone)]
pub struct EmailSinkConfig {
    pub service_url: String,
    pub api_key: Option<String>,
    pub notification_email: String,
    pub from_email: String,
}

/// Record-store (CRM-like) endpoint and table.
#[derive(Debug, Clone)]
pub struct RecordStoreSinkConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("SHEETS_WEBHOOK_URL");
        env::remove_var("EMAIL_SERVICE_URL");
        env::remove_var("EMAIL_API_KEY");
        env::remove_var("NOTIFICATION_EMAIL");
        env::remove_var("FROM_EMAIL");
        env::remove_var("RECORD_STORE_BASE_URL");
        env::remove_var("RECORD_STORE_API_KEY");
        env::remove_var("RECORD_STORE_TABLE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.sinks.sheets.webhook_url.is_none());
        assert!(config.sinks.email.api_key.is_none());
        assert_eq!(config.sinks.email.service_url, "https://api.resend.com/emails");
        assert_eq!(config.sinks.record_store.table, "Consultations");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn sink_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SHEETS_WEBHOOK_URL", "https://hooks.example.com/sheet");
        env::set_var("EMAIL_API_KEY", "key-123");
        env::set_var("RECORD_STORE_BASE_URL", "https://records.example.com/v0/base");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.sinks.sheets.webhook_url.as_deref(),
            Some("https://hooks.example.com/sheet")
        );
        assert_eq!(config.sinks.email.api_key.as_deref(), Some("key-123"));
        assert_eq!(
            config.sinks.record_store.base_url.as_deref(),
            Some("https://records.example.com/v0/base")
        );
    }
}
