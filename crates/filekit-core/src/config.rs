//! Configuration module
//!
//! Settings are read from the process environment (a `.env` file is loaded
//! first when present). Numeric settings fall back to their defaults when
//! unparsable; structural problems fail startup through [`Config::validate`].

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const SERVER_PORT: u16 = 8080;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const RATE_LIMIT_PER_MINUTE: u32 = 10;
const TEMP_RETENTION_SECS: u64 = 3600;
const CLEANUP_INTERVAL_SECS: u64 = 300;
const JOB_QUEUE_SIZE: usize = 100;
const PROCESS_TIMEOUT_SECS: u64 = 600;
const MIN_SESSION_SECRET_LEN: usize = 32;
/// Uploads are buffered in memory, so the limit is capped well below overflow.
const MAX_UPLOAD_SIZE_MB_CEILING: usize = 4096;
const PROCESS_TIMEOUT_SECS_CEILING: u64 = 24 * 3600;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub session_secret: String,
    /// Shared directory for uploads and generated outputs
    pub temp_dir: PathBuf,
    pub max_upload_size_mb: usize,
    pub rate_limit_per_minute: u32,
    /// Number of reverse proxies in front of the service (0 = trust the socket peer only)
    pub trusted_proxy_count: usize,
    pub temp_retention_secs: u64,
    pub cleanup_interval_secs: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub pdftoppm_path: String,
    pub max_concurrent_jobs: usize,
    pub job_queue_size: usize,
    pub process_timeout_secs: u64,
}

fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!(
                    "SESSION_SECRET not set; generating a per-process secret"
                );
                format!("filekit-{}-{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
            }
        };

        let temp_dir = env::var("TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("filekit"));

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
            environment,
            cors_origins,
            session_secret,
            temp_dir,
            max_upload_size_mb: parse_or("MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB),
            rate_limit_per_minute: parse_or("RATE_LIMIT_PER_MINUTE", RATE_LIMIT_PER_MINUTE),
            trusted_proxy_count: parse_or("TRUSTED_PROXY_COUNT", 0),
            temp_retention_secs: parse_or("TEMP_RETENTION_SECS", TEMP_RETENTION_SECS),
            cleanup_interval_secs: parse_or("CLEANUP_INTERVAL_SECS", CLEANUP_INTERVAL_SECS),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            pdftoppm_path: env::var("PDFTOPPM_PATH").unwrap_or_else(|_| "pdftoppm".to_string()),
            max_concurrent_jobs: parse_or("MAX_CONCURRENT_JOBS", default_concurrency()).max(1),
            job_queue_size: parse_or("JOB_QUEUE_SIZE", JOB_QUEUE_SIZE).max(1),
            process_timeout_secs: parse_or("PROCESS_TIMEOUT_SECS", PROCESS_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_mb == 0 || self.max_upload_size_mb > MAX_UPLOAD_SIZE_MB_CEILING {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB must be between 1 and {}",
                MAX_UPLOAD_SIZE_MB_CEILING
            ));
        }

        if self.process_timeout_secs == 0 || self.process_timeout_secs > PROCESS_TIMEOUT_SECS_CEILING {
            return Err(anyhow::anyhow!(
                "PROCESS_TIMEOUT_SECS must be between 1 and {}",
                PROCESS_TIMEOUT_SECS_CEILING
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_PER_MINUTE must be greater than 0"
            ));
        }

        if self.temp_retention_secs == 0 {
            return Err(anyhow::anyhow!("TEMP_RETENTION_SECS must be greater than 0"));
        }

        if self.is_production() {
            if self.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
                ));
            }
            if self.session_secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(anyhow::anyhow!(
                    "SESSION_SECRET must be at least {} characters long in production",
                    MIN_SESSION_SECRET_LEN
                ));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(
            self.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            session_secret: format!("filekit-{}", uuid::Uuid::new_v4()),
            temp_dir: env::temp_dir().join("filekit"),
            max_upload_size_mb: MAX_UPLOAD_SIZE_MB,
            rate_limit_per_minute: RATE_LIMIT_PER_MINUTE,
            trusted_proxy_count: 0,
            temp_retention_secs: TEMP_RETENTION_SECS,
            cleanup_interval_secs: CLEANUP_INTERVAL_SECS,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            pdftoppm_path: "pdftoppm".to_string(),
            max_concurrent_jobs: default_concurrency(),
            job_queue_size: JOB_QUEUE_SIZE,
            process_timeout_secs: PROCESS_TIMEOUT_SECS,
        }
    }
}
