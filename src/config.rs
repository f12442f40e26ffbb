use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Carepath";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of yes/no questions in one assessment.
pub const QUESTION_BUDGET: usize = 5;

/// Questionnaire sessions untouched for this long are dropped.
pub const ASSESSMENT_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Highest daily score that still maps to `Low` severity.
pub const LOW_SEVERITY_MAX_SCORE: u8 = 3;
/// Highest daily score that still maps to `Medium` severity.
pub const MEDIUM_SEVERITY_MAX_SCORE: u8 = 7;
/// Upper bound of the daily symptom score scale.
pub const MAX_SCORE: u8 = 10;

/// Env var overriding the API bind address.
pub const BIND_ENV: &str = "CAREPATH_BIND";
/// Env var pointing at a JSON disease taxonomy to use instead of the built-in one.
pub const TAXONOMY_ENV: &str = "CAREPATH_TAXONOMY";
/// Env var overriding the database location.
pub const DATABASE_ENV: &str = "CAREPATH_DB";

/// Get the application data directory (~/Carepath/).
///
/// Falls back to the working directory when no home directory is known
/// (containers, service accounts).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the tracking database. `CAREPATH_DB` wins when set.
pub fn database_path() -> PathBuf {
    std::env::var_os(DATABASE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| app_data_dir().join("carepath.db"))
}

/// Optional taxonomy override file.
pub fn taxonomy_path() -> Option<PathBuf> {
    std::env::var_os(TAXONOMY_ENV).map(PathBuf::from)
}

/// Address the API server listens on.
pub fn bind_addr() -> SocketAddr {
    std::env::var(BIND_ENV)
        .ok()
        .and_then(|raw| parse_bind_addr(&raw))
        .unwrap_or_else(default_bind_addr)
}

fn parse_bind_addr(raw: &str) -> Option<SocketAddr> {
    match raw.trim().parse() {
        Ok(addr) => Some(addr),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "Ignoring invalid {BIND_ENV}");
            None
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7410))
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "carepath_lib=info,carepath=info,tower_http=warn"
}
