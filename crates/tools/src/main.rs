use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use formats::Track;
use session::SessionConfig;
use tools::{
    HostPermission, POLL_ENV, Replay, ReplayHost, StatusLine, check_point, check_report,
    load_config, read_boundary,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "geofence", about = "Check positions against a drawn boundary")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one point and print the status.
    Check {
        #[arg(long)]
        boundary: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Print the status line as the page would render it.
        #[arg(long, conflicts_with = "json")]
        html: bool,
        #[arg(long)]
        json: bool,
    },
    /// Drive a full session with a recorded track.
    Replay {
        #[arg(long)]
        track: PathBuf,
        #[arg(long)]
        boundary: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = HostPermission::Granted)]
        permission: HostPermission,
        #[arg(long)]
        no_geolocation: bool,
        /// Pace ticks at the configured poll interval instead of replaying instantly.
        #[arg(long)]
        realtime: bool,
        #[arg(long)]
        html: bool,
    },
    /// Print the default configuration as JSON.
    Defaults,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check {
            boundary,
            lat,
            lng,
            html,
            json,
        } => cmd_check(&boundary, lat, lng, html, json),
        Command::Replay {
            track,
            boundary,
            config,
            permission,
            no_geolocation,
            realtime,
            html,
        } => {
            let host = ReplayHost {
                geolocation: !no_geolocation,
                permission,
            };
            cmd_replay(&track, boundary.as_deref(), config.as_deref(), host, realtime, html)
        }
        Command::Defaults => {
            let json = SessionConfig::default()
                .to_json_pretty()
                .map_err(|e| e.to_string())?;
            println!("{json}");
            Ok(())
        }
    }
}

fn cmd_check(boundary: &Path, lat: f64, lng: f64, html: bool, json: bool) -> Result<(), String> {
    let config = load_config(None, poll_override().as_deref())?;
    let boundary = read_boundary(boundary)?;
    let session = check_point(config, boundary, lat, lng)?;
    let status = session.status();

    if json {
        let text = serde_json::to_string_pretty(&check_report(&session, lat, lng))
            .map_err(|e| e.to_string())?;
        println!("{text}");
    } else if html {
        println!("{}", status.to_html());
    } else {
        println!("{status}");
    }
    Ok(())
}

fn cmd_replay(
    track: &Path,
    boundary: Option<&Path>,
    config: Option<&Path>,
    host: ReplayHost,
    realtime: bool,
    html: bool,
) -> Result<(), String> {
    let config = load_config(config, poll_override().as_deref())?;
    let text = fs::read_to_string(track).map_err(|e| format!("read {track:?}: {e}"))?;
    let track = Track::from_json_str(&text).map_err(|e| format!("{track:?}: {e}"))?;
    info!(entries = track.len(), ?host, "replaying track");

    let period = config.poll_interval();
    let mut replay = Replay::new(config, track, host);
    if let Some(path) = boundary {
        replay.draw_boundary(read_boundary(path)?);
    }

    if realtime {
        run_realtime(&mut replay, period, html)?;
    } else {
        replay.run_to_end();
        print_lines(replay.drain_log(), html);
    }

    let poller = replay.session().poller();
    info!(
        requests = poller.requests_issued(),
        skipped = poller.skipped_ticks(),
        interval_running = poller.interval_running(),
        in_flight = poller.in_flight(),
        state = ?poller.state(),
        elapsed_s = replay.clock().0,
        markers = replay.surface().markers().len(),
        "replay finished"
    );
    Ok(())
}

fn run_realtime(replay: &mut Replay, period: Duration, html: bool) -> Result<(), String> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| format!("tokio runtime: {e}"))?;

    rt.block_on(async {
        replay.start();
        print_lines(replay.drain_log(), html);

        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately; the startup request covered it.
        interval.tick().await;
        loop {
            interval.tick().await;
            let more = replay.step();
            print_lines(replay.drain_log(), html);
            if !more {
                break;
            }
        }
    });
    Ok(())
}

fn print_lines(lines: Vec<StatusLine>, html: bool) {
    for line in lines {
        let text = if html {
            line.status.to_html()
        } else {
            line.status.to_string()
        };
        println!("[{:>8.1}s] {text}", line.at.0);
    }
}

fn poll_override() -> Option<String> {
    env::var(POLL_ENV).ok()
}
