use anyhow::Context;
use clap::Parser;
use rewear_waitlist::utils::{logger, validation::Validate};
use rewear_waitlist::{app, AppConfig, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置 (logger 還沒初始化前先讀檔，才知道要不要用 JSON)
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config file '{}'", cli.config))?;
    cli.apply_overrides(&mut config);

    logger::init_logger(config.logging.json, cli.verbose);

    tracing::info!("Starting rewear-waitlist");
    tracing::debug!(
        "Bind {}, storage {:?}, generator model {}",
        config.bind_address(),
        config.storage.backend,
        config.generator.model
    );

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    if cli.check {
        println!("Configuration OK");
        return Ok(());
    }

    if let Err(e) = app::run(config).await {
        tracing::error!("Server failed: {} (Category: {:?})", e, e.category());
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
        return Err(e.into());
    }

    Ok(())
}
