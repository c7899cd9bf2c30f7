use std::net::IpAddr;
use std::path::PathBuf;

use ipnet::IpNet;

/// 100 MiB, the ceiling for a whole multipart submission body.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 100 << 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    /// Per-file cap enforced while copying to disk. `None` means only the
    /// body ceiling applies.
    pub max_file_size: Option<u64>,
    pub trusted_proxies: Vec<IpNet>,
    pub cors_origins: Vec<String>,
    pub purge_uploads: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("FORMCAST_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMCAST_HOST: {e}"))?;

        let port: u16 = env_or("FORMCAST_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid FORMCAST_PORT: {e}"))?;

        let upload_dir = PathBuf::from(env_or("FORMCAST_UPLOAD_DIR", "./uploads"));

        let max_upload_size: usize = env_or(
            "FORMCAST_MAX_UPLOAD_SIZE",
            &DEFAULT_MAX_UPLOAD_SIZE.to_string(),
        )
        .parse()
        .map_err(|e| format!("Invalid FORMCAST_MAX_UPLOAD_SIZE: {e}"))?;

        let max_file_size: Option<u64> = std::env::var("FORMCAST_MAX_FILE_SIZE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid FORMCAST_MAX_FILE_SIZE: {e}"))
            })
            .transpose()?;

        let trusted_proxies: Vec<IpNet> = split_list(&env_or("FORMCAST_TRUSTED_PROXIES", ""))
            .map(|s| {
                s.parse()
                    .map_err(|e| format!("Invalid FORMCAST_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cors_origins = split_list(&env_or("FORMCAST_CORS_ORIGINS", ""))
            .map(|s| s.to_string())
            .collect();

        let purge_uploads = match env_or("FORMCAST_PURGE_UPLOADS", "false").as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => return Err(format!("Invalid FORMCAST_PURGE_UPLOADS: {other}")),
        };

        let log_level = env_or("FORMCAST_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            host,
            port,
            upload_dir,
            max_upload_size,
            max_file_size,
            trusted_proxies,
            cors_origins,
            purge_uploads,
            log_level,
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
