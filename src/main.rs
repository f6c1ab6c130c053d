//! Glycoscreen: diabetes symptom intake terminal.
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glycoscreen::adapters::sanitize::SanitizingMakeWriter;
use glycoscreen::tui::App;
use glycoscreen::ClientConfig;

fn main() -> Result<()> {
    // Logs written to the terminal would corrupt the alternate screen.
    // auto: file when interactive, stdout otherwise.
    let log_mode = std::env::var("GLYCOSCREEN_LOG_MODE").unwrap_or_else(|_| "auto".to_string());

    let interactive = std::io::stdout().is_terminal();
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stdout" => false,
        _ => interactive,
    };

    let (writer, _guard) = if use_file {
        let log_file = std::env::var("GLYCOSCREEN_LOG_FILE")
            .unwrap_or_else(|_| "glycoscreen.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting Glycoscreen...");

    let config = ClientConfig::from_env();
    tracing::info!(
        "Prediction service: predict={}, health={}",
        config.predict_url(),
        config.health_url()
    );
    match config.request_timeout {
        Some(timeout) => tracing::info!("Request timeout: {}s", timeout.as_secs()),
        None => tracing::info!("Request timeout: none"),
    }

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("Glycoscreen shutdown complete.");
    Ok(())
}
