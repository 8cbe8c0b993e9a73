use sdgen::logger::{self, LogLevel, LoggerConfig};
use sdgen::{Config, StabilityClient};
use std::env;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut logger_config = match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => LoggerConfig::production(),
        _ => LoggerConfig::development().with_prefix("sdgen-proxy"),
    };
    if let Some(level) = env::var("RUST_LOG").ok().as_deref().and_then(LogLevel::parse) {
        logger_config = logger_config.with_level(level);
    }
    logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    log::info!("🖼️  Available models:");
    for model in StabilityClient::supported_models() {
        log::info!("  {} - {} ({} credits)", model.id, model.name, model.credits);
    }

    sdgen::server::run(config).await?;
    Ok(())
}
