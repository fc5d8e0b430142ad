use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::board::{
    BoardPolicy, OrganizationStatus, ResumePolicy, DEFAULT_PAGE_SIZE, DEFAULT_RESUME_MAX_BYTES,
};

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
    pub board: BoardConfig,
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
            board: BoardConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Job board policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub page_size: u32,
    pub resume_max_bytes: u64,
    pub organization_signup_status: OrganizationStatus,
    /// Prefix for resume URLs handed out by the bundled storage adapter.
    pub public_base_url: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            resume_max_bytes: DEFAULT_RESUME_MAX_BYTES,
            organization_signup_status: OrganizationStatus::Active,
            public_base_url: "https://jobs.example.com".to_string(),
        }
    }
}

impl BoardConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let page_size = match env::var("BOARD_PAGE_SIZE") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPageSize)?,
            Err(_) => defaults.page_size,
        };

        let resume_max_bytes = match env::var("BOARD_RESUME_MAX_BYTES") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::InvalidResumeLimit)?,
            Err(_) => defaults.resume_max_bytes,
        };

        let organization_signup_status = match env::var("BOARD_ORG_SIGNUP_STATUS") {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "active" => OrganizationStatus::Active,
                "pending" => OrganizationStatus::Pending,
                _ => return Err(ConfigError::InvalidSignupStatus { value }),
            },
            Err(_) => defaults.organization_signup_status,
        };

        let public_base_url =
            env::var("BOARD_PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url);

        Ok(Self {
            page_size,
            resume_max_bytes,
            organization_signup_status,
            public_base_url,
        })
    }

    pub fn policy(&self) -> BoardPolicy {
        BoardPolicy {
            page_size: self.page_size,
            resume: ResumePolicy::new(self.resume_max_bytes),
            organization_signup_status: self.organization_signup_status,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPageSize,
    InvalidResumeLimit,
    InvalidSignupStatus { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPageSize => {
                write!(f, "BOARD_PAGE_SIZE must be a positive integer")
            }
            ConfigError::InvalidResumeLimit => {
                write!(f, "BOARD_RESUME_MAX_BYTES must be a positive integer")
            }
            ConfigError::InvalidSignupStatus { value } => write!(
                f,
                "BOARD_ORG_SIGNUP_STATUS must be 'active' or 'pending' (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "BOARD_PAGE_SIZE",
            "BOARD_RESUME_MAX_BYTES",
            "BOARD_ORG_SIGNUP_STATUS",
            "BOARD_PUBLIC_BASE_URL",
        ] {
            env::remove_var(key);
        }
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
        assert_eq!(config.board, BoardConfig::default());
        assert_eq!(config.board.policy().resume.max_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn board_overrides_feed_the_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BOARD_PAGE_SIZE", "20");
        env::set_var("BOARD_RESUME_MAX_BYTES", "1048576");
        env::set_var("BOARD_ORG_SIGNUP_STATUS", "pending");
        let config = AppConfig::load().expect("config loads");
        let policy = config.board.policy();
        assert_eq!(policy.page_size, 20);
        assert_eq!(policy.resume.max_bytes(), 1_048_576);
        assert_eq!(
            policy.organization_signup_status,
            OrganizationStatus::Pending
        );
        reset_env();
    }

    #[test]
    fn rejects_invalid_board_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BOARD_PAGE_SIZE", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPageSize)
        ));

        reset_env();
        env::set_var("BOARD_ORG_SIGNUP_STATUS", "suspended");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidSignupStatus { .. })
        ));
        reset_env();
    }
}
