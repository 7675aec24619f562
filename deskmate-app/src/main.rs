use anyhow::{Context, Result};
use clap::Parser;
use deskmate_app::bootstrap::build_assistant;
use deskmate_app::cli::Cli;
use deskmate_app::config::AppConfig;
use deskmate_app::logging::init_logging;
use deskmate_runtime::StopSignal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration after CLI overrides")?;

    init_logging(&config.assistant.log_level);

    let (stop_tx, stop) = StopSignal::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current step");
            let _ = stop_tx.send(true);
        }
    });

    let assistant = build_assistant(&config, !cli.once, stop)
        .await
        .context("Failed to start assistant")?;

    if cli.once {
        let result = assistant.run_once(cli.user_note()).await?;
        println!("{}", result.response_text);
        if let Some(path) = &result.audio_path {
            println!("Audio saved: {}", path.display());
        }
        return Ok(());
    }

    if assistant.has_listener() && cli.user_note().is_some() {
        warn!("--note is ignored while a wake word is configured");
    }

    let completed = assistant
        .run_loop(config.interval()?, cli.user_note(), cli.max_turns)
        .await?;
    info!(completed, "Assistant stopped");
    Ok(())
}
