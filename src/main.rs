//! cellview demo host
//!
//! Shows a fixed seed pattern and hands the viewer a copy shifted one cell
//! to the right on every cycle, so `update` can be seen between bursts.
//!
//! # Quick Start
//!
//! ```text
//! cellview                    # Default settings (starts paused)
//! cellview --speed 50         # 50 frames per unpaused cycle
//! cellview --no-auto-pause    # Keep playing until 'p' is pressed
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cellview::config::Config;
use cellview::{ActiveCellSet, CrosstermTerminal, LoopControl, Visualizer};

/// Command line options
#[derive(Default)]
struct Options {
    /// Config file to read instead of ~/.cellview/config.toml
    config_path: Option<PathBuf>,
    speed: Option<u32>,
    marker: Option<char>,
    no_auto_pause: bool,
    /// Save the effective config and exit
    write_config: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("cellview {}", VERSION);
}

fn print_help() {
    eprintln!("cellview {} - terminal viewer for sparse 2D cell sets", VERSION);
    eprintln!();
    eprintln!("Usage: cellview [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --speed <N>       Frames per unpaused cycle (10-7000, default 512)");
    eprintln!("  -m, --marker <C>      Glyph for active cells (default #)");
    eprintln!("  -c, --config <PATH>   Read configuration from PATH");
    eprintln!("      --no-auto-pause   Keep playing after each burst");
    eprintln!("      --write-config    Save the effective configuration and exit");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Arrows, 4/8/6/2       Move view");
    eprintln!("  7/9/3/1               Move view diagonally");
    eprintln!("  p                     Pause / unpause");
    eprintln!("  + / -                 Fewer / more frames per cycle");
    eprintln!("  =                     Default speed");
    eprintln!("  q, Ctrl+C             Quit");
    eprintln!();
    eprintln!("Configuration: ~/.cellview/config.toml");
    eprintln!("Log file:      ~/.cellview/cellview.log");
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "--speed" => {
                i += 1;
                let value = args.get(i).ok_or("Missing speed argument")?;
                let speed = value
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid speed: {}", value))?;
                options.speed = Some(speed);
            }
            "-m" | "--marker" => {
                i += 1;
                let value = args.get(i).ok_or("Missing marker argument")?;
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => options.marker = Some(ch),
                    _ => return Err(format!("Marker must be a single character: {}", value)),
                }
            }
            "-c" | "--config" => {
                i += 1;
                let value = args.get(i).ok_or("Missing config path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--no-auto-pause" => {
                options.no_auto_pause = true;
            }
            "--write-config" => {
                options.write_config = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Merge file configuration and command line overrides.
///
/// A broken default config file falls back to the defaults; the reason is
/// returned so it can be logged once logging is up.
fn load_config(options: &Options) -> anyhow::Result<(Config, Option<String>)> {
    let mut fallback = None;
    let mut config = match &options.config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => match Config::try_load() {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                let path = Config::get_config_path().unwrap_or_default();
                let reason = format!("Ignoring config {}: {}", path.display(), e);
                eprintln!("Warning: {}", reason);
                fallback = Some(reason);
                Config::default()
            }
        },
    };

    if let Some(speed) = options.speed {
        config.playback.default_speed = speed;
    }
    if let Some(marker) = options.marker {
        config.marker = marker;
    }
    if options.no_auto_pause {
        config.playback.auto_pause = false;
    }
    config.validate()?;
    Ok((config, fallback))
}

/// Log to ~/.cellview/cellview.log; the terminal itself belongs to the viewer.
fn init_logging(config: &Config) {
    let log_path = Config::config_dir()
        .map(|dir| dir.join("cellview.log"))
        .unwrap_or_else(|| PathBuf::from("cellview.log"));

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Seed pattern: a cross at the origin, a glider and a diagonal line
fn seed_pattern() -> ActiveCellSet {
    let mut cells = ActiveCellSet::new();
    cells.extend((-3..=3).map(|d| (d, 0)));
    cells.extend((-3..=3).map(|d| (0, d)));
    cells.extend([(11, 4), (12, 5), (10, 6), (11, 6), (12, 6)]);
    cells.extend((0..20).map(|d| (20 + d, 8 + d)));
    cells
}

fn run(vis: &mut Visualizer<CrosstermTerminal>, config: &Config) -> anyhow::Result<()> {
    let options = config.render_options();
    let seed = seed_pattern();
    let mut generation: i64 = 0;

    loop {
        match vis.render(&options)? {
            LoopControl::Quit => {
                info!("quit after {} generations", generation);
                return Ok(());
            }
            LoopControl::Continue => {
                generation += 1;
                vis.update(seed.translated(generation, 0));
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let (config, fallback) = load_config(&options)?;

    if options.write_config {
        config.save().context("Failed to write config")?;
        eprintln!("Configuration written");
        return Ok(());
    }

    init_logging(&config);
    info!("cellview {} starting...", VERSION);
    if let Some(reason) = fallback {
        warn!("{}", reason);
    }

    let settings = config.viewer_settings()?;
    let mut vis = Visualizer::with_settings(CrosstermTerminal::new(), seed_pattern(), settings)?;

    let result = run(&mut vis, &config);

    // Always restore the terminal, then report
    let cleanup = vis.shutdown();
    if let Err(e) = &result {
        error!("viewer failed: {:#}", e);
    }
    result?;
    cleanup?;
    Ok(())
}
