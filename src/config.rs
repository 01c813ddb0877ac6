use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Where uploaded files live.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local {
        upload_dir: PathBuf,
        public_base_url: String,
    },
    S3 {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        region: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub max_resume_bytes: usize,
    pub default_page_limit: i64,
    pub max_page_limit: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = require_env("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: require_env("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "jobnest".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "jobnest-users".into()),
            ttl_minutes: parse_env("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parse_env("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .to_lowercase()
            .as_str()
        {
            "local" => StorageConfig::Local {
                upload_dir: std::env::var("UPLOAD_DIR")
                    .unwrap_or_else(|_| "uploads".into())
                    .into(),
                public_base_url: std::env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".into()),
            },
            "s3" => StorageConfig::S3 {
                endpoint: require_env("S3_ENDPOINT")?,
                bucket: require_env("S3_BUCKET")?,
                access_key: require_env("S3_ACCESS_KEY")?,
                secret_key: require_env("S3_SECRET_KEY")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            },
            other => anyhow::bail!("unknown STORAGE_BACKEND '{other}' (expected local or s3)"),
        };

        let default_page_limit: i64 = parse_env("DEFAULT_PAGE_LIMIT", 20);
        let max_page_limit: i64 = parse_env("MAX_PAGE_LIMIT", 100);
        anyhow::ensure!(
            default_page_limit >= 1 && max_page_limit >= default_page_limit,
            "page limits must satisfy 1 <= DEFAULT_PAGE_LIMIT <= MAX_PAGE_LIMIT"
        );

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .context("APP_PORT must be a valid port number")?,
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".into()),
            ),
            jwt,
            storage,
            max_resume_bytes: parse_env("MAX_RESUME_BYTES", 10 * 1024 * 1024),
            default_page_limit,
            max_page_limit,
        })
    }
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Splits a comma separated origin list. `*` (or nothing) means any origin.
pub(crate) fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}
