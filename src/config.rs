use std::{fmt, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use argon2::Params;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => bail!("unknown environment mode {:?}", other),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Argon2id cost parameters. Defaults follow the argon2 crate.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let redis = RedisConfig {
            host: var("REDIS_HOST").context("REDIS_HOST must be set")?,
            port: parse_or(&var, "REDIS_PORT", 6379)?,
            password: var("REDIS_PASSWORD"),
        };

        let environment = match var("APP_ENV").or_else(|| var("NODE_ENV")) {
            Some(v) => v.parse()?,
            None => Environment::Development,
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: parse_or(&var, "HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&var, "HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&var, "HASH_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "PORT", 3000)?,
            environment,
            redis,
            rate_limit: RateLimitConfig {
                max_requests: parse_or(&var, "RATE_LIMIT_MAX", 100)?,
                window_secs: parse_or(&var, "RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
            },
            hash,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_only_redis_host_is_set() {
        let cfg = load(&[("REDIS_HOST", "localhost")]).expect("config should load");
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.redis.host, "localhost");
        assert_eq!(cfg.redis.port, 6379);
        assert!(cfg.redis.password.is_none());
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.rate_limit.max_requests, 100);
        assert_eq!(cfg.rate_limit.window(), Duration::from_secs(900));
        assert_eq!(cfg.hash.memory_kib, Params::DEFAULT_M_COST);
    }

    #[test]
    fn reads_all_values() {
        let cfg = load(&[
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_PASSWORD", "s3cret"),
            ("PORT", "8081"),
            ("APP_ENV", "production"),
            ("RATE_LIMIT_MAX", "5"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
            ("HASH_MEMORY_KIB", "65536"),
            ("HASH_ITERATIONS", "3"),
            ("HASH_PARALLELISM", "4"),
        ])
        .expect("config should load");
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.redis.port, 6380);
        assert_eq!(cfg.redis.password.as_deref(), Some("s3cret"));
        assert!(cfg.environment.is_production());
        assert_eq!(cfg.rate_limit.max_requests, 5);
        assert_eq!(cfg.hash.memory_kib, 65536);
        assert_eq!(cfg.hash.iterations, 3);
        assert_eq!(cfg.hash.parallelism, 4);
    }

    #[test]
    fn node_env_is_a_fallback_for_app_env() {
        let cfg = load(&[("REDIS_HOST", "h"), ("NODE_ENV", "test")]).unwrap();
        assert_eq!(cfg.environment, Environment::Test);

        let cfg = load(&[("REDIS_HOST", "h"), ("NODE_ENV", "test"), ("APP_ENV", "prod")]).unwrap();
        assert_eq!(cfg.environment, Environment::Production);
    }

    #[test]
    fn empty_password_means_none() {
        let cfg = load(&[("REDIS_HOST", "h"), ("REDIS_PASSWORD", "")]).unwrap();
        assert!(cfg.redis.password.is_none());
    }

    #[test]
    fn missing_redis_host_is_an_error() {
        let err = load(&[("PORT", "3000")]).unwrap_err();
        assert!(err.to_string().contains("REDIS_HOST"));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = load(&[("REDIS_HOST", "h"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(load(&[("REDIS_HOST", "h"), ("APP_ENV", "staging")]).is_err());
    }
}
