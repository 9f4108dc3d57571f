use std::env;
use dotenv::dotenv;
use serde::Deserialize;
use log::{info, warn};

pub const DEFAULT_API_KEY: &str = "change-me-please";
pub const DEFAULT_ALERT_TIMEOUT_MINUTES: i64 = 5;
/// One year.
pub const MAX_ALERT_TIMEOUT_MINUTES: i64 = 525_600;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub alerts: AlertConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// A host that has not reported for longer than this is considered silent.
    pub timeout_minutes: i64,
    pub check_interval_seconds: u64,
    pub recipient_email: String,
    pub sender_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parse a numeric variable, keeping the default when it is absent or malformed.
fn parsed_var_or<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value {:?} for {}, using default {}", raw, name, default);
            default
        }),
        Err(_) => default,
    }
}

impl AlertConfig {
    /// Silence timeout; values outside `1..=MAX_ALERT_TIMEOUT_MINUTES` fall back
    /// to the default.
    pub fn timeout(&self) -> chrono::Duration {
        let default = || chrono::Duration::minutes(DEFAULT_ALERT_TIMEOUT_MINUTES);
        if !(1..=MAX_ALERT_TIMEOUT_MINUTES).contains(&self.timeout_minutes) {
            return default();
        }
        chrono::Duration::try_minutes(self.timeout_minutes).unwrap_or_else(default)
    }

    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.check_interval_seconds)
    }
}

impl Config {
    fn load_env_files() {
        match env::var("ENV_FILE_PATH") {
            Ok(env_file_path) if !env_file_path.is_empty() => {
                info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
                dotenv::from_filename(&env_file_path).ok();
            }
            _ => {
                dotenv().ok();
                // .env.<environment> overrides the base file outside development
                let environment_hint = env::var("RUST_ENV")
                    .unwrap_or_else(|_| "development".to_string())
                    .parse()
                    .unwrap_or(Environment::Development);
                let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
                if env_file != ".env.development" {
                    let _ = dotenv::from_filename(&env_file);
                }
            }
        }
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_files();

        let environment = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);

        info!("Loading configuration for environment: {:?}", environment);

        let config = Self::from_env(environment);
        config.validate()?;
        config.log_configuration();

        Ok(config)
    }

    /// Build the configuration from the current process environment only.
    pub fn from_env(environment: Environment) -> Self {
        Config {
            server: Self::load_server_config(&environment),
            database: Self::load_database_config(&environment),
            security: SecurityConfig {
                api_key: var_or("API_KEY", DEFAULT_API_KEY),
            },
            alerts: AlertConfig {
                timeout_minutes: parsed_var_or("ALERT_TIMEOUT_MINUTES", DEFAULT_ALERT_TIMEOUT_MINUTES),
                check_interval_seconds: parsed_var_or("ALERT_CHECK_INTERVAL_SECONDS", 60),
                recipient_email: var_or("ALERT_RECIPIENT_EMAIL", "admin@example.com"),
                sender_email: var_or("ALERT_SENDER_EMAIL", "alerts@example.com"),
            },
            smtp: SmtpConfig {
                hostname: var_or("SMTP_HOSTNAME", "smtp.gmail.com"),
                port: parsed_var_or("SMTP_PORT", 587),
                username: var_or("SMTP_USERNAME", "user@example.com"),
                password: var_or("SMTP_PASSWORD", "password"),
            },
            environment,
        }
    }

    fn load_server_config(env: &Environment) -> ServerConfig {
        let default_workers = match env {
            Environment::Production => 4,
            _ => 1,
        };
        ServerConfig {
            host: var_or("SERVER_HOST", "0.0.0.0"),
            port: parsed_var_or("SERVER_PORT", 8000),
            workers: parsed_var_or("BACKEND_WORKERS", default_workers),
        }
    }

    fn load_database_config(env: &Environment) -> DatabaseConfig {
        let default_url = match env {
            Environment::Test => "sqlite::memory:",
            _ => "sqlite://firewall_monitor.db?mode=rwc",
        };
        DatabaseConfig {
            url: var_or("DATABASE_URL", default_url),
            max_connections: parsed_var_or("DATABASE_MAX_CONNECTIONS", 5),
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("SERVER_PORT must be greater than 0".into());
        }
        if !(1..=MAX_ALERT_TIMEOUT_MINUTES).contains(&self.alerts.timeout_minutes) {
            return Err(format!(
                "ALERT_TIMEOUT_MINUTES must be between 1 and {}, got {}",
                MAX_ALERT_TIMEOUT_MINUTES, self.alerts.timeout_minutes
            )
            .into());
        }
        if self.alerts.check_interval_seconds == 0 {
            return Err("ALERT_CHECK_INTERVAL_SECONDS must be greater than 0".into());
        }
        for (name, address) in [
            ("ALERT_RECIPIENT_EMAIL", &self.alerts.recipient_email),
            ("ALERT_SENDER_EMAIL", &self.alerts.sender_email),
        ] {
            if address.parse::<lettre::Address>().is_err() {
                return Err(format!("{} is not a valid e-mail address: {}", name, address).into());
            }
        }

        if self.is_production() {
            if self.security.api_key == DEFAULT_API_KEY || self.security.api_key.is_empty() {
                return Err("API_KEY must be changed from its default in production".into());
            }
        } else if self.security.api_key == DEFAULT_API_KEY {
            warn!("API_KEY is using its default value; set it before exposing the service");
        }

        Ok(())
    }

    fn log_configuration(&self) {
        info!("Configuration loaded:");
        info!("  Environment: {:?}", self.environment);
        info!("  Server: {}:{} ({} workers)", self.server.host, self.server.port, self.server.workers);
        info!("  Database: {}", self.database.url);
        info!(
            "  Alerts: timeout {}m, checked every {}s, sent to {}",
            self.alerts.timeout_minutes, self.alerts.check_interval_seconds, self.alerts.recipient_email
        );
        info!("  SMTP: {}:{}", self.smtp.hostname, self.smtp.port);
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
