pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::generator::{GeminiGenerator, StaticGenerator};
pub use adapters::storage::{FileStore, MemoryStore};
pub use config::AppConfig;
pub use crate::core::{geo::GeoGate, registry::WaitlistRegistry};
pub use utils::error::{Result, WaitlistError};
