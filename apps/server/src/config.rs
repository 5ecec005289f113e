use std::time::Duration;

use tobby_core::recurring::DEFAULT_JOB_TIMEOUT;

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Soft deadline for a single generation run.
    pub job_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env if present; real env vars win.
        dotenvy::dotenv().ok();

        let listen_addr =
            std::env::var("TOBBY_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let db_path =
            std::env::var("TOBBY_DB_PATH").unwrap_or_else(|_| "data/tobby.db".to_string());
        let job_timeout = std::env::var("TOBBY_JOB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_JOB_TIMEOUT);

        Config {
            listen_addr,
            db_path,
            job_timeout,
        }
    }
}
