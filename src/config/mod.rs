//! Configuration module for the Hangar gateway
//!
//! Handles loading configuration from environment variables and config files.
//! Configuration is read once at startup; request handlers only ever see the
//! resolved [`AppState`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::middleware::{PathMatcher, RouteGuard};

/// Fixed expiry of the `token` cookie.
///
/// This is a calendar date, not an offset from issuance: every cookie issued
/// before it expires at the same instant, and cookies issued after it are
/// born expired.
pub const DEFAULT_SESSION_EXPIRES_AT: &str = "2025-04-24T04:33:25Z";

/// Fixed expiry of the `csrf-token` cookie. Same caveat as the session cookie.
pub const DEFAULT_CSRF_EXPIRES_AT: &str = "2025-04-18T01:45:53Z";

/// Path patterns the route guard is applied to
pub const DEFAULT_GUARD_MATCHERS: [&str; 7] = [
    "/dashboard/:path*",
    "/settings/:path*",
    "/instructors/:path*",
    "/students/:path*",
    "/aircraft/:path*",
    "/schedule/:path*",
    "/flight-tracking/:path*",
];

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Token values handed out by the cookie issuer
    #[serde(default)]
    pub auth: AuthConfig,
    /// Cookie expiry instants
    #[serde(default)]
    pub cookies: CookieConfig,
    /// Route guard configuration
    #[serde(default)]
    pub guard: GuardConfig,
    /// Dashboard frontend the guard forwards to
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Value of the `token` cookie. Empty when unset.
    #[serde(default)]
    pub session_token: String,
    /// Value of the `csrf-token` cookie. Empty when unset.
    #[serde(default)]
    pub csrf_token: String,
    /// Where unauthenticated requests to protected paths are sent
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// RFC 3339 expiry of the `token` cookie
    #[serde(default = "default_session_expires_at")]
    pub session_expires_at: String,
    /// RFC 3339 expiry of the `csrf-token` cookie
    #[serde(default = "default_csrf_expires_at")]
    pub csrf_expires_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// Path patterns (`/prefix/:path*` or exact paths) the guard runs on
    #[serde(default = "default_guard_matchers", deserialize_with = "string_or_list")]
    pub matchers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the dashboard frontend, e.g. `http://127.0.0.1:3001`
    pub url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Address to bind to. `host` must be an IP address.
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let ip = self.host.trim().parse::<IpAddr>().map_err(|e| {
            AppError::Config(format!("server.host '{}' is not an IP address: {e}", self.host))
        })?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_token: String::new(),
            csrf_token: String::new(),
            login_path: default_login_path(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            session_expires_at: default_session_expires_at(),
            csrf_expires_at: default_csrf_expires_at(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            matchers: default_guard_matchers(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_session_expires_at() -> String {
    DEFAULT_SESSION_EXPIRES_AT.to_string()
}

fn default_csrf_expires_at() -> String {
    DEFAULT_CSRF_EXPIRES_AT.to_string()
}

fn default_guard_matchers() -> Vec<String> {
    DEFAULT_GUARD_MATCHERS.iter().map(|m| m.to_string()).collect()
}

fn default_upstream_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from environment and config files
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            // Set defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("auth.session_token", "")?
            .set_default("auth.csrf_token", "")?
            .set_default("auth.login_path", default_login_path())?
            .set_default("cookies.session_expires_at", default_session_expires_at())?
            .set_default("cookies.csrf_expires_at", default_csrf_expires_at())?
            .set_default("guard.matchers", default_guard_matchers())?
            .set_default("upstream.timeout_seconds", default_upstream_timeout())?
            // Load from config file if exists
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Override with environment variables (HANGAR_ prefix)
            .add_source(environment())
            .build()?;

        config.try_deserialize()
    }
}

/// `HANGAR_<SECTION>__<KEY>` variables, e.g. `HANGAR_AUTH__SESSION_TOKEN`.
///
/// Values are kept as strings so tokens such as `007` are not reparsed as
/// numbers; typed fields are converted during deserialization.
fn environment() -> config::Environment {
    config::Environment::with_prefix("HANGAR")
        .prefix_separator("_")
        .separator("__")
}

/// Accepts a list, or a comma separated string as set from the environment
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        List(Vec<String>),
        String(String),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::List(items) => items,
        StringOrList::String(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Resolved expiry instants for the issued cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieExpiry {
    pub session: OffsetDateTime,
    pub csrf: OffsetDateTime,
}

impl CookieExpiry {
    pub fn from_config(config: &CookieConfig) -> AppResult<Self> {
        Ok(Self {
            session: parse_expiry("cookies.session_expires_at", &config.session_expires_at)?,
            csrf: parse_expiry("cookies.csrf_expires_at", &config.csrf_expires_at)?,
        })
    }
}

fn parse_expiry(key: &str, value: &str) -> AppResult<OffsetDateTime> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map_err(|e| AppError::Config(format!("{key} must be an RFC 3339 timestamp: {e}")))?
        .with_timezone(&Utc);

    OffsetDateTime::from_unix_timestamp(parsed.timestamp())
        .map_err(|e| AppError::Config(format!("{key} is out of range: {e}")))
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http_client: reqwest::Client,
    pub guard: RouteGuard,
    pub cookie_expiry: CookieExpiry,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("Hangar/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.upstream.timeout_seconds))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let matcher = PathMatcher::new(&config.guard.matchers)?;
        let guard = RouteGuard::new(matcher, config.auth.login_path.clone());
        let cookie_expiry = CookieExpiry::from_config(&config.cookies)?;

        crate::metrics::register_metrics();

        Ok(Self {
            config: Arc::new(config),
            http_client,
            guard,
            cookie_expiry,
        })
    }
}
