//! Configuration module
//!
//! Configuration is read from the environment (after loading a `.env` file when
//! present). Every value has a default matching the development setup, so an
//! empty environment yields a working server.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// Common constants
const HOST: &str = "127.0.0.1";
const PORT: u16 = 5000;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const MAX_FILE_SIZE_MB: usize = 16;
const DEFAULT_EXTENSIONS: &str = "png,jpg,jpeg,gif,webp";
const DEFAULT_CONTENT_TYPES: &str = "image/png,image/jpeg,image/gif,image/webp";
const OCR_MAX_CONCURRENT: usize = 2;
const OCR_TIMEOUT_SECS: u64 = 30;
const DICTIONARY_MAX_CONCURRENT: usize = 16;
const DICTIONARY_TIMEOUT_SECS: u64 = 5;
const CHAT_MAX_CONCURRENT: usize = 8;
const CHAT_TIMEOUT_SECS: u64 = 20;
const PROVIDER_QUEUE_TIMEOUT_MS: u64 = 2000;
const DICTIONARY_CACHE_CAPACITY: usize = 1024;
const DICTIONARY_CACHE_TTL_SECS: u64 = 3600;
const CHAT_MAX_MESSAGE_CHARS: usize = 2000;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// HTTP listener and cross-cutting server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
}

/// Upload validation limits and the scratch directory for in-flight uploads
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    pub upload_dir: PathBuf,
}

impl UploadConfig {
    /// Largest request body accepted on the upload route; `None` on overflow.
    pub fn request_body_limit(&self) -> Option<usize> {
        self.max_file_size_bytes.checked_add(MULTIPART_OVERHEAD_BYTES)
    }
}

/// Admission and timeout budget for one external collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderLimits {
    /// Maximum number of concurrent invocations
    pub max_concurrent: usize,
    /// Upper bound for a single invocation
    pub timeout: Duration,
    /// How long a request may wait for a free slot before it is refused
    pub queue_timeout: Duration,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub ocr: ProviderLimits,
    pub dictionary: ProviderLimits,
    pub chat: ProviderLimits,
    /// Number of entries kept by the dictionary cache; 0 disables caching
    pub dictionary_cache_capacity: usize,
    pub dictionary_cache_ttl: Duration,
    pub chat_max_message_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        let queue_timeout = Duration::from_millis(PROVIDER_QUEUE_TIMEOUT_MS);
        Self {
            server: ServerConfig {
                host: HOST.to_string(),
                port: PORT,
                environment: "development".to_string(),
                cors_origins: vec!["*".to_string()],
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            },
            upload: UploadConfig {
                max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
                allowed_extensions: split_list(DEFAULT_EXTENSIONS),
                allowed_content_types: split_list(DEFAULT_CONTENT_TYPES),
                upload_dir: env::temp_dir().join("kanji-uploads"),
            },
            ocr: ProviderLimits {
                max_concurrent: OCR_MAX_CONCURRENT,
                timeout: Duration::from_secs(OCR_TIMEOUT_SECS),
                queue_timeout,
            },
            dictionary: ProviderLimits {
                max_concurrent: DICTIONARY_MAX_CONCURRENT,
                timeout: Duration::from_secs(DICTIONARY_TIMEOUT_SECS),
                queue_timeout,
            },
            chat: ProviderLimits {
                max_concurrent: CHAT_MAX_CONCURRENT,
                timeout: Duration::from_secs(CHAT_TIMEOUT_SECS),
                queue_timeout,
            },
            dictionary_cache_capacity: DICTIONARY_CACHE_CAPACITY,
            dictionary_cache_ttl: Duration::from_secs(DICTIONARY_CACHE_TTL_SECS),
            chat_max_message_chars: CHAT_MAX_MESSAGE_CHARS,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse an environment variable, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| defaults.server.environment.clone());

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            Err(_) => PORT,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| defaults.server.cors_origins.clone());

        let max_file_size_mb = env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB);
        let max_file_size_bytes = mib_to_bytes(max_file_size_mb).ok_or_else(|| {
            anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", max_file_size_mb)
        })?;

        let queue_timeout = Duration::from_millis(env_or(
            "PROVIDER_QUEUE_TIMEOUT_MS",
            PROVIDER_QUEUE_TIMEOUT_MS,
        ));

        let config = Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
                port,
                environment,
                cors_origins,
                http_concurrency_limit: env_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT)
                    .max(1),
            },
            upload: UploadConfig {
                max_file_size_bytes,
                allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                    .map(|s| split_list(&s))
                    .unwrap_or(defaults.upload.allowed_extensions),
                allowed_content_types: env::var("ALLOWED_CONTENT_TYPES")
                    .map(|s| split_list(&s))
                    .unwrap_or(defaults.upload.allowed_content_types),
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.upload.upload_dir),
            },
            ocr: ProviderLimits {
                max_concurrent: env_or("OCR_MAX_CONCURRENT", OCR_MAX_CONCURRENT),
                timeout: Duration::from_secs(env_or("OCR_TIMEOUT_SECS", OCR_TIMEOUT_SECS)),
                queue_timeout,
            },
            dictionary: ProviderLimits {
                max_concurrent: env_or("DICTIONARY_MAX_CONCURRENT", DICTIONARY_MAX_CONCURRENT),
                timeout: Duration::from_secs(env_or(
                    "DICTIONARY_TIMEOUT_SECS",
                    DICTIONARY_TIMEOUT_SECS,
                )),
                queue_timeout,
            },
            chat: ProviderLimits {
                max_concurrent: env_or("CHAT_MAX_CONCURRENT", CHAT_MAX_CONCURRENT),
                timeout: Duration::from_secs(env_or("CHAT_TIMEOUT_SECS", CHAT_TIMEOUT_SECS)),
                queue_timeout,
            },
            dictionary_cache_capacity: env_or(
                "DICTIONARY_CACHE_CAPACITY",
                DICTIONARY_CACHE_CAPACITY,
            ),
            dictionary_cache_ttl: Duration::from_secs(env_or(
                "DICTIONARY_CACHE_TTL_SECS",
                DICTIONARY_CACHE_TTL_SECS,
            )),
            chat_max_message_chars: env_or("CHAT_MAX_MESSAGE_CHARS", CHAT_MAX_MESSAGE_CHARS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.upload.request_body_limit().is_none() {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB is too large: {} bytes leaves no room for the request body",
                self.upload.max_file_size_bytes
            ));
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        for (name, limits) in [
            ("OCR", &self.ocr),
            ("DICTIONARY", &self.dictionary),
            ("CHAT", &self.chat),
        ] {
            if limits.max_concurrent == 0 {
                return Err(anyhow::anyhow!(
                    "{}_MAX_CONCURRENT must be at least 1",
                    name
                ));
            }
            if limits.timeout.is_zero() {
                return Err(anyhow::anyhow!("{}_TIMEOUT_SECS must be greater than 0", name));
            }
        }

        if self.chat_max_message_chars == 0 {
            return Err(anyhow::anyhow!(
                "CHAT_MAX_MESSAGE_CHARS must be greater than 0"
            ));
        }

        Ok(())
    }
}

fn mib_to_bytes(mib: usize) -> Option<usize> {
    mib.checked_mul(1024 * 1024)
}
