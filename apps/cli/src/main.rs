use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use console::style;
use reelnotes_core::{Config, HttpBackend, Session, SubmitOutcome};
use tokio::sync::mpsc;

use crate::{player::ClockPlayer, view::TerminalView};

mod player;
mod view;

/// Playback keeps going this long past the last segment start.
const TAIL_SECS: f64 = 30.0;
const WATCH_INTERVAL: Duration = Duration::from_millis(250);

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "reelnotes")]
#[command(about = "Follow a video's transcript with keyword segments and generated images")]
struct Cli {
    /// Video URL or bare 11 character video id
    input: String,

    /// Generate keywords and images again even if cached segments exist
    #[arg(short, long)]
    regenerate: bool,

    /// Backend base URL. Overrides REELNOTES_BACKEND_URL.
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Seconds of playback to follow. Defaults to 30s past the last segment.
    #[arg(short, long)]
    duration: Option<f64>,

    /// Playback speed of the simulated player
    #[arg(short, long, default_value_t = 1.0)]
    speed: f64,

    /// Readiness polls before giving up on image generation (0 = never)
    #[arg(long)]
    max_attempts: Option<u32>,
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.backend_url {
        config = config.with_backend_url(url)?;
    }
    if let Some(attempts) = cli.max_attempts {
        config.readiness_max_attempts = attempts;
    }
    Ok(config)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if !(cli.speed.is_finite() && cli.speed > 0.0) {
        fail("--speed must be a positive number");
    }

    let config = build_config(&cli).unwrap_or_else(|e| fail(e));
    let backend = HttpBackend::new(&config).unwrap_or_else(|e| fail(e));

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let session = Session::new(
        config,
        backend,
        ClockPlayer::new(events_tx, cli.speed),
        TerminalView::new(),
    );

    println!(
        "\n{}  {}",
        style("reelnotes").cyan().bold(),
        style("Transcript Viewer").dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    session.widget().announce_ready();
    if let Some(event) = events_rx.recv().await {
        session.handle_player_event(event);
    }

    let outcome = match session.submit(&cli.input, cli.regenerate).await {
        Ok(outcome) => outcome,
        Err(e) => fail(e),
    };
    if matches!(
        outcome,
        SubmitOutcome::NoTranscript | SubmitOutcome::NoSegments | SubmitOutcome::Superseded
    ) {
        return Ok(());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut watch = tokio::time::interval(WATCH_INTERVAL);
    let mut gave_up = false;

    loop {
        tokio::select! {
            Some(event) = events_rx.recv() => session.handle_player_event(event),
            _ = &mut ctrl_c => break,
            _ = watch.tick() => {
                let player = session.widget();
                if player.is_playing() {
                    let end = cli.duration.unwrap_or_else(|| {
                        session
                            .segments()
                            .iter()
                            .last()
                            .map(|segment| segment.start + TAIL_SECS)
                            .unwrap_or(TAIL_SECS)
                    });
                    if player.position() >= end {
                        player.finish();
                    }
                } else if player.is_loaded() && !session.is_polling() {
                    break;
                } else if !player.is_loaded() && !session.is_awaiting_readiness() {
                    gave_up = true;
                    break;
                }
            }
        }
    }

    session.shutdown();
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{} {}",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    if gave_up {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_human_readable() {
        assert_eq!(format_duration(Duration::from_millis(4200)), "4.2s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::parse_from([
            "reelnotes",
            "https://youtu.be/dQw4w9WgXcQ",
            "--regenerate",
            "--backend-url",
            "http://localhost:9000",
            "--max-attempts",
            "3",
        ]);

        assert!(cli.regenerate);
        assert_eq!(cli.speed, 1.0);

        let config = build_config(&cli).unwrap();
        assert_eq!(config.backend_url.as_str(), "http://localhost:9000/");
        assert_eq!(config.readiness_max_attempts, 3);
    }
}
