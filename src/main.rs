//! Tournament Buzzer
//!
//! Terminal front end: Enter sounds the buzzer, other keys change the
//! selected tone and delay.

use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tournament_buzzer::alarm::{
    AfterBlowDelay, AlarmEvent, ProgressSequence, ProgressSimulator, RequestOutcome, ToneScheduler,
};
use tournament_buzzer::audio::{DefaultAudioOutput, RouteSelector, ToneCatalog, ToneId};
use tournament_buzzer::input::{Buzzer, Handled, KeyHandler};
use tournament_buzzer::sensors::AccessoryProbe;
use tournament_buzzer::storage::{load_config, load_config_from};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Progress bar width in characters
const BAR_WIDTH: usize = 20;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to the data directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tone to start with (first, second, third, fourth)
    #[arg(short, long)]
    tone: Option<ToneId>,

    /// After-blow delay to start with (none, 0.1 .. 1)
    #[arg(short, long)]
    delay: Option<AfterBlowDelay>,

    /// Never route to a Bluetooth accessory
    #[arg(long)]
    no_bluetooth: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tournament Buzzer v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(tone) = args.tone {
        config.alarm.default_tone = tone;
    }
    if let Some(delay) = args.delay {
        config.alarm.default_delay = delay;
    }
    if args.no_bluetooth {
        config.route.probe_bluetooth = false;
    }

    let selector = RouteSelector::new(
        AccessoryProbe::from_enabled(config.route.probe_bluetooth),
        config.route.probe_timeout(),
    );
    let scheduler = ToneScheduler::spawn(
        selector,
        ToneCatalog::standard(),
        DefaultAudioOutput::new(config.audio.clone()),
        &config.alarm,
    );
    let progress = ProgressSimulator::new(config.progress.tick_interval());
    let mut buzzer = Buzzer::new(scheduler.clone(), progress, &config.alarm);
    let keys = KeyHandler::new();

    tokio::spawn(report_events(scheduler.clone()));

    let mut lines = spawn_stdin_reader();
    print_help(&keys);
    print_selection(&buzzer);

    while let Some(line) = lines.recv().await {
        let Some(action) = keys.handle(&line) else {
            println!("Unknown key: {:?} (? for help)", line.trim());
            continue;
        };

        match buzzer.handle(action).await? {
            Handled::Fired(fired) => match fired.outcome {
                RequestOutcome::Accepted => {
                    if let Some(sequence) = fired.progress {
                        tokio::spawn(render_progress(sequence));
                    }
                }
                RequestOutcome::Dropped => println!("{}", buzzer.button_label()),
            },
            Handled::ToneSelected(_) | Handled::DelaySelected(_) => print_selection(&buzzer),
            Handled::ShowHelp => print_help(&keys),
            Handled::Quit => break,
        }
    }

    // Let a tone in flight finish before exiting
    scheduler.wait_idle().await?;
    tracing::info!("Tournament Buzzer shutting down");

    Ok(())
}

/// Read stdin lines on a blocking thread.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

async fn render_progress(mut sequence: ProgressSequence) {
    while let Some(state) = sequence.next().await {
        let filled = (state.fraction * BAR_WIDTH as f32).round() as usize;
        print!(
            "\r[{}{}] {:>4}/{}ms",
            "#".repeat(filled),
            " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            state.elapsed_ms,
            state.total_ms
        );
        let _ = std::io::stdout().flush();
        if !state.running {
            println!();
        }
    }
}

async fn report_events(scheduler: ToneScheduler) {
    let mut events = scheduler.subscribe_events();

    loop {
        match events.recv().await {
            Ok(AlarmEvent::ToneStarted { tone, route }) => {
                println!("{} tone on {}", tone, route);
            }
            Ok(AlarmEvent::PlaybackFailed { tone, message }) => {
                println!("{} tone could not play: {}", tone, message);
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!("Event reporter skipped {} events", n);
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_selection(buzzer: &Buzzer) {
    println!("Tone: {}  Delay: {}", buzzer.tone(), buzzer.delay());
}

fn print_help(keys: &KeyHandler) {
    println!("Keys:");
    for (key, action) in keys.bindings() {
        let key = if key.is_empty() { "<enter>" } else { key.as_str() };
        println!("  {:<10} {}", key, action.description());
    }
    println!("  d<delay>   Set after-blow delay (d0.3, dnone)");
}
