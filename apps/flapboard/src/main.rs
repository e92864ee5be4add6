use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use render_integration::HeadlessRenderer;
use rotator_core::Rotator;
use shared::{
    domain::{Mode, TimingMode},
    protocol::RotatorEvent,
};
use tokio::sync::broadcast;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::Settings;
use terminal::TerminalRenderer;

#[derive(Parser, Debug)]
#[command(name = "flapboard", about = "Rotate headline words on a split-flap board")]
struct Args {
    #[arg(long, default_value = "flapboard.toml")]
    config: PathBuf,
    /// Comma-separated word list.
    #[arg(long, value_delimiter = ',')]
    words: Vec<String>,
    #[arg(long)]
    mode: Option<Mode>,
    #[arg(long)]
    timing_mode: Option<TimingMode>,
    #[arg(long)]
    first_interval_ms: Option<u64>,
    #[arg(long)]
    other_interval_ms: Option<u64>,
    #[arg(long)]
    last_interval_ms: Option<u64>,
    #[arg(long)]
    cascade_delay_ms: Option<u64>,
    #[arg(long)]
    flip_speed_ms: Option<u64>,
    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long)]
    run_for_secs: Option<u64>,
    /// Print events as JSON lines instead of drawing the board.
    #[arg(long)]
    json_events: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        let rotator = &mut settings.rotator;
        if !self.words.is_empty() {
            rotator.words = self.words.clone();
        }
        if let Some(mode) = self.mode {
            rotator.mode = mode;
        }
        if let Some(timing_mode) = self.timing_mode {
            rotator.timing_mode = timing_mode;
        }
        if let Some(ms) = self.first_interval_ms {
            rotator.first_word_interval_ms = ms;
        }
        if let Some(ms) = self.other_interval_ms {
            rotator.other_word_interval_ms = ms;
        }
        if let Some(ms) = self.last_interval_ms {
            rotator.last_word_interval_ms = Some(ms);
        }
        if let Some(ms) = self.cascade_delay_ms {
            rotator.cascade_delay_ms = ms;
        }
        if let Some(ms) = self.flip_speed_ms {
            rotator.flip_speed_ms = ms;
        }
        if self.json_events {
            settings.json_events = true;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    args.apply(&mut settings);
    info!(
        words = settings.rotator.words.len(),
        mode = %settings.rotator.mode,
        timing_mode = %settings.rotator.timing_mode,
        json_events = settings.json_events,
        "flapboard: starting"
    );

    let rotator = if settings.json_events {
        let rotator = Rotator::new(settings.rotator, Arc::new(HeadlessRenderer::new()))
            .await
            .context("invalid rotator configuration")?;
        let events = rotator.subscribe_events();
        tokio::spawn(async move {
            if let Err(error) = print_json_events(events).await {
                warn!(%error, "flapboard: event printer stopped");
            }
        });
        rotator
    } else {
        let terminal = Arc::new(TerminalRenderer::stdout());
        let rotator = Rotator::new(settings.rotator, terminal.clone())
            .await
            .context("invalid rotator configuration")?;
        tokio::spawn(track_accents(terminal, rotator.subscribe_events()));
        rotator
    };

    rotator.start().await;
    match args.run_for_secs {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?,
    }
    rotator.destroy().await;

    if !settings.json_events {
        println!();
    }
    info!("flapboard: stopped");
    Ok(())
}

async fn print_json_events(events: broadcast::Receiver<RotatorEvent>) -> Result<()> {
    let mut stream = BroadcastStream::new(events);
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => println!("{}", serde_json::to_string(&event)?),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "flapboard: event printer lagged");
            }
        }
    }
    Ok(())
}

async fn track_accents(
    terminal: Arc<TerminalRenderer<std::io::Stdout>>,
    events: broadcast::Receiver<RotatorEvent>,
) {
    let mut stream = BroadcastStream::new(events);
    while let Some(item) = stream.next().await {
        if let Ok(RotatorEvent::LetterLanded { slot, accent, .. }) = item {
            if let Err(error) = terminal.mark_accent(slot, accent).await {
                warn!(%error, "flapboard: accent redraw failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
