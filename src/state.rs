use crate::auth::{password::PasswordHasher, services::AuthService};
use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;
use crate::storage::{RedisUserStore, UserStore};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = Arc::new(
            RedisUserStore::connect(&config.redis)
                .await
                .context("connect to redis")?,
        ) as Arc<dyn UserStore>;
        let hasher = PasswordHasher::from_config(&config.hash)?;

        Ok(Self::from_parts(config, store, hasher))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        Self {
            auth: AuthService::new(store, hasher),
            limiter,
            config,
        }
    }

    /// In-memory store and cheap hashing, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_limit(1_000)
    }

    #[cfg(test)]
    pub fn fake_with_limit(max_requests: u32) -> Self {
        use crate::config::{Environment, HashConfig, RateLimitConfig, RedisConfig};
        use crate::storage::MemoryUserStore;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            environment: Environment::Test,
            redis: RedisConfig {
                host: "fake".into(),
                port: 6379,
                password: None,
            },
            rate_limit: RateLimitConfig {
                max_requests,
                window_secs: 900,
            },
            hash: HashConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        });

        let hasher = PasswordHasher::from_config(&config.hash).expect("valid test params");
        let store = Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>;
        Self::from_parts(config, store, hasher)
    }
}
