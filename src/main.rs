use color_eyre::{eyre::eyre, Result};
use padwatch::config::PadwatchConfig;
use padwatch::host::{frame_clock, GilrsHost};
use padwatch::{GamepadEventDetail, GamepadEventType, GamepadSdk};
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup_errors()?;

    let config_path = PadwatchConfig::path_from_args(std::env::args().skip(1))?
        .unwrap_or_else(PadwatchConfig::default_path);
    let config = PadwatchConfig::load(&config_path).await?;
    setup_logging(&config);
    debug!("Using config: {:?}", config);

    // Ctrl-C stops frame delivery, which is the only way the poll loop ends
    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, stopping frame clock"),
            Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
        }
        ctrl_c.cancel();
    });

    let (scheduler, mut clock) = frame_clock(config.frame_interval(), shutdown);
    let host = GilrsHost::new(config.slots)
        .map_err(|e| eyre!("Failed to set up gamepad host: {}", e))?;
    let mut sdk = GamepadSdk::new(host, scheduler);

    for &event_type in &config.log_events {
        sdk.add_event_listener(event_type, move |detail| log_event(event_type, detail));
    }
    info!(
        "Watching {} slots every {}ms, logging {:?}",
        config.slots, config.frame_interval_ms, config.log_events
    );

    while clock.next_frame().await {
        sdk.tick();
    }

    info!("Stopped after {} ticks", sdk.ticks());
    Ok(())
}

fn setup_errors() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

fn setup_logging(config: &PadwatchConfig) {
    let requested = config.effective_log_level(std::env::var("RUST_LOG").ok());
    let level = Level::from_str(&requested);
    FmtSubscriber::builder()
        .with_max_level(*level.as_ref().unwrap_or(&Level::INFO))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    if level.is_err() {
        warn!("Unknown log level {:?}, using info", requested);
    }
}

fn log_event(event_type: GamepadEventType, detail: &GamepadEventDetail) {
    let pad = &detail.gamepad;
    match event_type {
        GamepadEventType::Connect | GamepadEventType::Disconnect => {
            info!("[{}] {} {}", pad.index, event_type, pad.id);
        }
        GamepadEventType::ButtonPress | GamepadEventType::ButtonRelease => {
            info!(
                "[{}] {} button={:?} value={:.3}",
                pad.index,
                event_type,
                detail.button_index,
                detail.button.map_or(0.0, |b| b.value)
            );
        }
        GamepadEventType::AxisChange => {
            info!(
                "[{}] {} axis={:?} value={:.4}",
                pad.index,
                event_type,
                detail.axis_index,
                detail.axis_value.unwrap_or_default()
            );
        }
    }
}
