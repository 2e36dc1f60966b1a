/// Configuration management for posts-service
///
/// Everything is read from environment variables (a `.env` file is loaded
/// first by the binary). Invalid values fail startup instead of being ignored.
use db_pool::DbConfig;
use resilience::{ConflictPolicy, RetryPolicy};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// Which storage backend serves posts and comments
    pub storage: StorageBackend,
    /// Only used by the relational backend
    pub database: DbConfig,
    pub pagination: PaginationConfig,
    pub retry: RetryConfig,
    pub locks: LockConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    Postgres,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::InMemory => "in-memory",
            StorageBackend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-memory" | "inmemory" | "memory" => Ok(StorageBackend::InMemory),
            "postgres" | "postgresql" | "relational" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// Largest page a caller may request
    pub max_page_size: usize,
}

/// Retry settings for transactional units of work
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Retry timeouts, deadlocks and serialization failures instead of escalating them
    pub retry_on_conflict: bool,
}

#[derive(Debug, Clone)]
pub struct LockConfig {
    pub prune_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let storage = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::InMemory,
        };

        let max_page_size: usize = parse_env_or_default("PAGINATION_MAX_PAGE_SIZE", 100)?;
        if max_page_size == 0 {
            return Err("PAGINATION_MAX_PAGE_SIZE must be greater than zero".to_string());
        }

        let max_attempts: u32 = parse_env_or_default("RETRY_MAX_ATTEMPTS", 5)?;
        if max_attempts == 0 {
            return Err("RETRY_MAX_ATTEMPTS must be at least 1".to_string());
        }

        let database = match storage {
            StorageBackend::Postgres => DbConfig::from_env("posts-service")?,
            StorageBackend::InMemory => DbConfig::for_service("posts-service"),
        };

        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                host: std::env::var("POSTS_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("POSTS_SERVICE_PORT", 8080)?,
            },
            storage,
            database,
            pagination: PaginationConfig { max_page_size },
            retry: RetryConfig {
                max_attempts,
                base_delay_ms: parse_env_or_default("RETRY_BASE_DELAY_MS", 2_000)?,
                retry_on_conflict: parse_env_or_default("RETRY_ON_CONFLICT", false)?,
            },
            locks: LockConfig {
                prune_interval_secs: parse_env_or_default("LOCK_PRUNE_INTERVAL_SECS", 300)?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            conflict_policy: if self.retry.retry_on_conflict {
                ConflictPolicy::Retry
            } else {
                ConflictPolicy::Escalate
            },
        }
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
