use crate::adapters::generator::{GeminiGenerator, StaticGenerator};
use crate::adapters::storage::{FileStore, MemoryStore};
use crate::config::{AppConfig, GeneratorConfig, StorageBackend, StorageConfig};
use crate::core::{GeoGate, MessageGenerator, WaitlistRegistry, WaitlistStore};
use crate::utils::error::{Result, WaitlistError};
use std::sync::Arc;

/// Shared by every handler. Holds no per-user data.
pub struct AppState {
    pub registry: WaitlistRegistry,
    pub gate: GeoGate,
    pub generator: Arc<dyn MessageGenerator>,
    pub max_history_messages: usize,
}

impl AppState {
    pub fn new(
        registry: WaitlistRegistry,
        gate: GeoGate,
        generator: Arc<dyn MessageGenerator>,
        max_history_messages: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            gate,
            generator,
            max_history_messages,
        })
    }

    pub async fn from_config(config: &AppConfig) -> Result<Arc<Self>> {
        let store = build_store(&config.storage).await?;
        let generator = build_generator(&config.generator)?;

        Ok(Self::new(
            WaitlistRegistry::new(store),
            config.geo.gate(),
            generator,
            config.generator.max_history_messages,
        ))
    }
}

pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn WaitlistStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory waitlist store, signups will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => Ok(Arc::new(FileStore::open(&config.path).await?)),
        #[cfg(feature = "postgres")]
        StorageBackend::Postgres => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| WaitlistError::MissingConfigError {
                    field: "storage.url".to_string(),
                })?;
            let store =
                crate::adapters::storage::PostgresStore::connect(url, config.max_connections)
                    .await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageBackend::Postgres => Err(WaitlistError::ConfigError {
            message: "storage.backend = \"postgres\" needs a build with the `postgres` feature"
                .to_string(),
        }),
    }
}

pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn MessageGenerator>> {
    if config.api_key().is_none() {
        tracing::info!("No generator API key configured, using static messages");
        return Ok(Arc::new(StaticGenerator));
    }

    tracing::info!("Message generation enabled with model {}", config.model);
    Ok(Arc::new(GeminiGenerator::from_config(config)?))
}
