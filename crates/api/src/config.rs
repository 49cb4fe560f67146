use std::path::PathBuf;

use prodscore_pipeline::manager::DEFAULT_MAX_CONCURRENT_JOBS;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for running batch jobs (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Serialized forest model loaded at startup.
    pub model_path: PathBuf,
    /// Where uploaded batch files are stored.
    pub upload_dir: PathBuf,
    /// Where batch result artifacts are written.
    pub results_dir: PathBuf,
    /// Batch jobs allowed to execute at once.
    pub max_concurrent_jobs: usize,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `MODEL_PATH`           | `model_rf.json`            |
    /// | `UPLOAD_DIR`           | `uploads`                  |
    /// | `RESULTS_DIR`          | `results`                  |
    /// | `MAX_CONCURRENT_JOBS`  | `4`                        |
    /// | `MAX_UPLOAD_BYTES`     | `16777216` (16 MiB)        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let model_path = PathBuf::from(
            std::env::var("MODEL_PATH").unwrap_or_else(|_| "model_rf.json".into()),
        );
        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
        let results_dir =
            PathBuf::from(std::env::var("RESULTS_DIR").unwrap_or_else(|_| "results".into()));

        let max_concurrent_jobs: usize = std::env::var("MAX_CONCURRENT_JOBS")
            .map(|v| v.parse().expect("MAX_CONCURRENT_JOBS must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_CONCURRENT_JOBS);

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "16777216".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            model_path,
            upload_dir,
            results_dir,
            max_concurrent_jobs,
            max_upload_bytes,
        }
    }
}
