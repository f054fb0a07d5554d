use anyhow::{Context, Result, bail};
use birthday_hunt_core::prelude::*;
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod trace;

use trace::read_trace;

#[derive(Parser, Debug)]
#[command(
    name = "hunt-replay",
    author,
    version,
    about = "Replay a recorded GPS trace through a scavenger hunt",
    long_about = "Feeds every position of a GeoJSON trace through a hunt session, exactly \
                  as the phone would, and reports which stages unlock along the way.\n\n\
                  Use it to check stage coordinates and proximity thresholds against a \
                  walk recorded on site before handing the hunt to the player."
)]
struct Args {
    /// Hunt configuration JSON
    #[arg(short, long)]
    config: PathBuf,

    /// GeoJSON trace: a LineString, or Point features in walking order
    #[arg(short, long)]
    trace: PathBuf,

    /// SQLite database holding progress (in-memory when omitted)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Discard saved progress before replaying
    #[arg(long)]
    fresh: bool,

    /// Jump to this stage index before replaying
    #[arg(long)]
    jump_to: Option<usize>,

    /// Do not press "next clue" automatically after a stage unlocks
    #[arg(long)]
    manual: bool,

    /// Milliseconds between replayed fixes. With 0 the whole trace may be
    /// consumed before an automatic "next clue" lands.
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Print every view update as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    tracing::info!("=== Hunt Replay ===");
    tracing::info!("Config: {}", args.config.display());
    tracing::info!("Trace: {}", args.trace.display());

    let config = HuntConfig::from_path(&args.config)
        .with_context(|| format!("Failed to load hunt configuration: {}", args.config.display()))?;
    let stage_titles: Vec<String> = config.stages.iter().map(|s| s.title.clone()).collect();

    if let Some(index) = args.jump_to {
        if index > config.stage_count() {
            bail!(
                "Cannot jump to stage {index}, the hunt only has {} stages",
                config.stage_count()
            );
        }
    }

    let fixes = read_trace(&args.trace)?;
    tracing::info!("Loaded {} fixes for {} stages", fixes.len(), config.stage_count());

    let store: Box<dyn ProgressStore> = match &args.database {
        Some(path) => {
            let mut store = SqliteProgressStore::open(path)
                .with_context(|| format!("Failed to open progress database: {}", path.display()))?;
            if args.fresh {
                store.clear().context("Failed to clear saved progress")?;
                tracing::info!("Cleared saved progress");
            }
            Box::new(store)
        }
        None => Box::new(MemoryProgressStore::default()),
    };

    let mut source = ReplayPositionSource::new(fixes, Duration::from_millis(args.interval_ms));
    let mut exhausted = source.exhausted();

    let (commands, mut command_rx) = mpsc::unbounded_channel();
    let (mut session, mut notifications) = HuntSession::new(config, store);

    if let Some(index) = args.jump_to {
        commands.send(Command::JumpTo(index))?;
    }
    commands.send(Command::Start)?;

    let runner = tokio::spawn(async move {
        session.run(&mut source, &mut command_rx).await;
        session.view()
    });

    let mut commands = Some(commands);
    let mut unlocked = 0usize;

    loop {
        tokio::select! {
            notification = notifications.recv() => {
                let Some(notification) = notification else { break };

                match notification {
                    Notification::ViewChanged(view) => {
                        if args.json {
                            println!("{}", serde_json::to_string(&view)?);
                        }
                    }
                    Notification::Unlocked { stage, title, message } => {
                        unlocked += 1;
                        tracing::info!("Found stage {stage} \"{title}\": {message}");
                        if !args.manual {
                            if let Some(commands) = &commands {
                                let _ = commands.send(Command::Advance);
                            }
                        }
                    }
                    Notification::Completed { message } => {
                        tracing::info!("Hunt complete: {message}");
                        commands = None;
                    }
                    Notification::PositionUnavailable(error) => {
                        tracing::warn!("Position source unavailable: {error}");
                    }
                }
            }
            _ = exhausted.wait_for(|done| *done), if commands.is_some() => {
                tracing::debug!("Trace finished, shutting the session down");
                commands = None;
            }
        }
    }

    let view = runner.await.context("Session task failed")?;

    tracing::info!("");
    tracing::info!("=== Summary ===");
    tracing::info!("Stages found: {unlocked}");
    match view.status {
        HuntStatus::NotStarted => tracing::info!("Hunt not started"),
        HuntStatus::Completed => tracing::info!("Hunt completed ({} stages)", view.stage_count),
        HuntStatus::InProgress { stage_index, found } => {
            let title = stage_titles.get(stage_index).map(String::as_str).unwrap_or("?");
            tracing::info!(
                "Stopped at stage {}/{} \"{}\"{}",
                stage_index + 1,
                view.stage_count,
                title,
                if found { " (found, not advanced)" } else { "" }
            );
            match view.distance_m {
                Some(distance) => tracing::info!("Last distance to target: {distance} m"),
                None => tracing::info!("No fix reached the current stage"),
            }
        }
    }

    Ok(())
}
