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

/// Top-level configuration for the back office.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub assistant: AssistantConfig,
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

        let auth = AuthConfig::from_env(environment)?;
        let assistant = AssistantConfig {
            endpoint: non_blank_var("ASSISTANT_ENDPOINT"),
            api_key: non_blank_var("ASSISTANT_API_KEY"),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth,
            assistant,
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
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

/// Bootstrap accounts registered at startup.
#[derive(Clone)]
pub struct AuthConfig {
    pub admin_username: String,
    /// Without a password no administrator account is created.
    pub admin_password: Option<String>,
    pub parent: Option<ParentAccount>,
}

#[derive(Clone)]
pub struct ParentAccount {
    pub username: String,
    pub password: String,
    pub student_id: String,
}

impl AuthConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let admin_username =
            non_blank_var("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());
        let admin_password = non_blank_var("ADMIN_PASSWORD");
        if admin_password.is_none() && environment == AppEnvironment::Production {
            return Err(ConfigError::MissingAdminPassword);
        }

        let parent = match (
            non_blank_var("PARENT_USERNAME"),
            non_blank_var("PARENT_PASSWORD"),
            non_blank_var("PARENT_STUDENT_ID"),
        ) {
            (None, None, None) => None,
            (Some(username), Some(password), Some(student_id)) => Some(ParentAccount {
                username,
                password,
                student_id,
            }),
            _ => return Err(ConfigError::IncompleteParentAccount),
        };

        Ok(Self {
            admin_username,
            admin_password,
            parent,
        })
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("parent", &self.parent)
            .finish()
    }
}

impl fmt::Debug for ParentAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentAccount")
            .field("username", &self.username)
            .field("student_id", &self.student_id)
            .finish_non_exhaustive()
    }
}

/// Generative-text endpoint. Absent endpoint disables the assistant routes.
#[derive(Clone, Default)]
pub struct AssistantConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingAdminPassword,
    IncompleteParentAccount,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingAdminPassword => {
                write!(f, "ADMIN_PASSWORD is required in production")
            }
            ConfigError::IncompleteParentAccount => write!(
                f,
                "PARENT_USERNAME, PARENT_PASSWORD and PARENT_STUDENT_ID must be set together"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::MissingAdminPassword
            | ConfigError::IncompleteParentAccount => None,
        }
    }
}
