//! Environment-derived worker configuration, validated once at startup.

mod secrets;

pub use secrets::ResolvedObjectStoreSecrets;

use anyhow::{Context, Result};

pub const ENV_DATABASE_URL: &str = "ACH_DATABASE_URL";
pub const ENV_OBJECT_STORE_ENDPOINT: &str = "ACH_OBJECT_STORE_ENDPOINT";
pub const ENV_OBJECT_STORE_ACCESS_KEY: &str = "ACH_OBJECT_STORE_ACCESS_KEY";
pub const ENV_OBJECT_STORE_SECRET_KEY: &str = "ACH_OBJECT_STORE_SECRET_KEY";
pub const ENV_OBJECT_STORE_BUCKET: &str = "ACH_OBJECT_STORE_BUCKET";
pub const ENV_PUBLIC_BASE_URL: &str = "ACH_PUBLIC_BASE_URL";
pub const ENV_BATCH_SIZE: &str = "ACH_BATCH_SIZE";
pub const ENV_POLL_INTERVAL_MS: &str = "ACH_POLL_INTERVAL_MS";
pub const ENV_MAX_ATTEMPTS: &str = "ACH_MAX_ATTEMPTS";

const DEFAULT_BATCH_SIZE: i64 = 50;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_MAX_ATTEMPTS: i32 = 10;

/// Validated worker configuration. Construct once at startup via
/// [`WorkerConfig::from_env`] and thread through by reference — never
/// scatter `std::env::var` calls across the rest of the crate graph.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub object_store_endpoint: String,
    pub object_store_bucket: String,
    pub object_store_secrets: ResolvedObjectStoreSecrets,
    pub public_base_url: String,
    pub batch_size: i64,
    pub poll_interval_ms: u64,
    pub max_attempts: i32,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = require_var(ENV_DATABASE_URL)?;
        let object_store_endpoint = require_var(ENV_OBJECT_STORE_ENDPOINT)?;
        let object_store_bucket = require_var(ENV_OBJECT_STORE_BUCKET)?;
        let access_key = require_var(ENV_OBJECT_STORE_ACCESS_KEY)?;
        let secret_key = require_var(ENV_OBJECT_STORE_SECRET_KEY)?;
        let public_base_url = require_var(ENV_PUBLIC_BASE_URL)?;

        let batch_size = optional_parsed(ENV_BATCH_SIZE, DEFAULT_BATCH_SIZE)?;
        let poll_interval_ms = optional_parsed(ENV_POLL_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS)?;
        let max_attempts = optional_parsed(ENV_MAX_ATTEMPTS, DEFAULT_MAX_ATTEMPTS)?;

        if batch_size <= 0 {
            anyhow::bail!("{ENV_BATCH_SIZE} must be a positive integer, got {batch_size}");
        }
        if max_attempts <= 0 {
            anyhow::bail!("{ENV_MAX_ATTEMPTS} must be a positive integer, got {max_attempts}");
        }

        Ok(Self {
            database_url,
            object_store_endpoint,
            object_store_bucket,
            object_store_secrets: ResolvedObjectStoreSecrets {
                access_key,
                secret_key,
            },
            public_base_url,
            batch_size,
            poll_interval_ms,
            max_attempts,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("missing required env var {name}"))
}

fn optional_parsed<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {name}: {e}")),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e).with_context(|| format!("reading env var {name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests mutate process-wide env vars, so they must not run concurrently
    // with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all() {
        for name in [
            ENV_DATABASE_URL,
            ENV_OBJECT_STORE_ENDPOINT,
            ENV_OBJECT_STORE_ACCESS_KEY,
            ENV_OBJECT_STORE_SECRET_KEY,
            ENV_OBJECT_STORE_BUCKET,
            ENV_PUBLIC_BASE_URL,
            ENV_BATCH_SIZE,
            ENV_POLL_INTERVAL_MS,
            ENV_MAX_ATTEMPTS,
        ] {
            std::env::remove_var(name);
        }
    }

    fn set_required() {
        std::env::set_var(ENV_DATABASE_URL, "postgres://localhost/ach");
        std::env::set_var(ENV_OBJECT_STORE_ENDPOINT, "https://minio.local");
        std::env::set_var(ENV_OBJECT_STORE_ACCESS_KEY, "key");
        std::env::set_var(ENV_OBJECT_STORE_SECRET_KEY, "topsecretvalue123");
        std::env::set_var(ENV_OBJECT_STORE_BUCKET, "badges");
        std::env::set_var(ENV_PUBLIC_BASE_URL, "https://cdn.example.com");
    }

    #[test]
    fn missing_required_var_fails_fast() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        let err = WorkerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_DATABASE_URL));
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        set_required();
        let cfg = WorkerConfig::from_env().unwrap();
        assert_eq!(cfg.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(cfg.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(cfg.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        set_required();
        let cfg = WorkerConfig::from_env().unwrap();
        let rendered = format!("{:?}", cfg.object_store_secrets);
        // Field names (`access_key`, `secret_key`) legitimately appear in
        // `Debug` output — only the configured values must not.
        assert!(!rendered.contains("topsecretvalue123"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        set_required();
        std::env::set_var(ENV_BATCH_SIZE, "0");
        assert!(WorkerConfig::from_env().is_err());
        std::env::remove_var(ENV_BATCH_SIZE);
    }
}
