use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub sources_path: PathBuf,
    /// Six-field cron expression driving the scrape cycle.
    pub scrape_schedule: String,
    /// Optional for the server (cache-only); the `sync` entry point
    /// requires it and exits before any work when it is absent.
    pub database_url: Option<String>,
    /// Gist export credentials; required only by the `export` entry point.
    pub github_token: Option<String>,
    pub gist_id: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    /// Upper bound on waiting for navigation or a product selector in the
    /// rendered-page strategy; the cycle proceeds when it expires.
    pub browser_wait_timeout_secs: u64,
    /// Cumulative scroll cap for lazy-load triggering, in pixels.
    pub browser_max_scroll_px: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field("scrape_schedule", &self.scrape_schedule)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[redacted]"),
            )
            .field("gist_id", &self.gist_id)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("browser_wait_timeout_secs", &self.browser_wait_timeout_secs)
            .field("browser_max_scroll_px", &self.browser_max_scroll_px)
            .finish()
    }
}

impl AppConfig {
    /// Returns the database URL, or the error the sink-writing entry points
    /// treat as fatal.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::MissingEnvVar`] when `DATABASE_URL`
    /// was not set.
    pub fn require_database_url(&self) -> Result<&str, crate::ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }

    /// Returns the Gist export credentials, or the error the export entry
    /// point treats as fatal.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::MissingEnvVar`] naming whichever of
    /// `GITHUB_TOKEN` / `SUQDB_GIST_ID` is absent.
    pub fn require_gist_credentials(&self) -> Result<(&str, &str), crate::ConfigError> {
        let token = self
            .github_token
            .as_deref()
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("GITHUB_TOKEN".to_string()))?;
        let gist_id = self
            .gist_id
            .as_deref()
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("SUQDB_GIST_ID".to_string()))?;
        Ok((token, gist_id))
    }
}
