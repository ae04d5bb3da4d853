use anyhow::{Context, Result};
use clap::Parser;
use ota_updater::{
    read_config, AcceptAll, CommandValidator, Credentials, UpdateOrchestrator, Validator,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG: &str = "ota.json";

/// OTA Updater - keep local files in step with GitHub
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the updater configuration file
    #[arg(short, long, env = "OTA_CONFIG", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Directory holding the tracked files
    #[arg(short, long, env = "OTA_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// GitHub user, sent as the User-Agent
    #[arg(long, env = "GITHUB_USER")]
    user: String,

    /// GitHub token used to authorize requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Check now, ignoring the update interval
    #[arg(long)]
    force: bool,

    /// Keep running and check every N seconds instead of checking once
    #[arg(long)]
    poll_seconds: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = read_config(&args.config)
        .await
        .with_context(|| format!("Failed to read {}", args.config.display()))?
        .with_context(|| format!("Config file {} not found", args.config.display()))?;

    // Diagnostics are only shown in debug mode
    let level = if config.debug { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let validator: Arc<dyn Validator> = match CommandValidator::from_argv(&config.validator) {
        Some(command) => Arc::new(command),
        None => Arc::new(AcceptAll),
    };

    let credentials = Credentials {
        user: args.user,
        token: args.token,
    };
    let options = config.to_options(args.work_dir);

    let mut updater =
        UpdateOrchestrator::with_github(credentials, &config.api_base_url, options, validator)
            .await
            .context("Failed to start updater")?;

    let updated = updater.check(args.force).await?;
    info!(updated, "Updates checked");

    if let Some(seconds) = args.poll_seconds {
        let mut ticker = tokio::time::interval(Duration::from_secs(seconds.max(1)));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let updated = updater.check(false).await?;
            info!(updated, "Updates checked");
        }
    }

    Ok(())
}
