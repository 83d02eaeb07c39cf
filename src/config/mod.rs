pub mod toml_config;

pub use toml_config::{AppConfig, GeneratorConfig, StorageBackend, StorageConfig};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rewear-waitlist")]
#[command(about = "Waitlist API for the ReWear campus launch")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "rewear.toml")]
    pub config: String,

    /// Override server.host from the config file
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port from the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
