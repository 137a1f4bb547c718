//! Microphone Tester Application
//!
//! Serves the web tester page and drives the capture session.

use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mic_tester::{
    audio::device::{default_selection, list_input_devices},
    config::AppConfig,
    session::SessionController,
    ui::WebServer,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Microphone Tester");

    // Load config if present, defaults otherwise
    let config = match AppConfig::default_path().filter(|p| p.exists()) {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };

    // List available input devices (labels may be empty until the
    // platform grants microphone permission)
    println!("\n=== Available Audio Input Devices ===");
    let devices = list_input_devices();
    if devices.is_empty() {
        println!("  (none found — check microphone permissions)");
    }
    for device in &devices {
        let default_marker = if default_selection(&devices) == Some(device) {
            " [DEFAULT]"
        } else {
            ""
        };
        let label = if device.label.is_empty() {
            "<unnamed>"
        } else {
            device.label.as_str()
        };
        println!("  {}{}", label, default_marker);
        println!("    ID: {}", device.id);
    }
    println!();

    // Create the session controller
    let controller =
        SessionController::new(Duration::from_millis(config.audio.tick_interval_ms));

    // Start web UI
    let web_server = WebServer::new(config.ui.clone(), controller.clone());
    let _web_handle = web_server.start_background();

    tracing::info!(
        "Web UI available at http://{}:{}",
        config.ui.bind_address,
        config.ui.http_port
    );

    // Run until interrupted, then force a stop so no hardware stream
    // outlives the process teardown.
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    controller.stop();

    Ok(())
}
