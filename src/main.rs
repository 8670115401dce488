use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use dialoguer::Input;
use std::path::{Path, PathBuf};
use subshot::{Config, Pipeline, PipelineRequest};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Subshot")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Turn a movie into an illustrated PDF of screenshots, subtitles and cast")
        .arg(
            Arg::new("video")
                .short('i')
                .long("video")
                .value_name("FILE")
                .help("Video file named like name.year.qualityP.type[.subtype].ext")
        )
        .arg(
            Arg::new("interval")
                .short('n')
                .long("interval")
                .value_name("SECONDS")
                .help("Seconds between screenshots")
                .value_parser(value_parser!(u64).range(1..))
        )
        .arg(
            Arg::new("subtitle")
                .short('s')
                .long("subtitle")
                .value_name("FILE")
                .help("Use a local .srt instead of downloading one")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
        )
        .arg(
            Arg::new("tolerance")
                .short('t')
                .long("tolerance")
                .value_name("SECONDS")
                .help("Subtitle matching window around each screenshot (default: interval / 2)")
                .value_parser(value_parser!(f64))
        )
        .arg(
            Arg::new("reuse-screenshots")
                .long("reuse-screenshots")
                .help("Keep screenshots already on disk instead of extracting again")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("refresh-cast")
                .long("refresh-cast")
                .help("Scrape the cast again even if a cast file exists")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
        )
        .get_matches();

    let default_filter = if matches.get_flag("verbose") {
        "subshot=debug,info"
    } else {
        "subshot=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(Path::new(path))
            .with_context(|| format!("failed to load config {}", path))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(tolerance) = matches.get_one::<f64>("tolerance") {
        config.document.tolerance = Some(*tolerance);
    }
    if matches.get_flag("reuse-screenshots") {
        config.screenshots.reuse_existing = true;
    }
    if matches.get_flag("refresh-cast") {
        config.metadata.reuse_side_file = false;
    }

    let video_path = match matches.get_one::<String>("video") {
        Some(path) => PathBuf::from(strip_quotes(path)),
        None => prompt_video_path()?,
    };
    let interval = match matches.get_one::<u64>("interval") {
        Some(interval) => *interval,
        None => prompt_interval()?,
    };

    info!("🚀 Subshot starting...");
    info!("🎬 Video: {}", video_path.display());
    info!("⏱️ Interval: {}s", interval);

    let mut request = PipelineRequest::new(video_path, interval);
    if let Some(subtitle) = matches.get_one::<String>("subtitle") {
        request = request.with_subtitle(strip_quotes(subtitle));
    }

    let pipeline = Pipeline::new(config)?;
    info!("🔧 {}", pipeline.config().summary());
    match pipeline.run(&request).await {
        Ok(outcome) => {
            info!("✅ Frames: {}", outcome.frames);
            info!("👥 Cast entries: {}", outcome.cast_entries);
            info!("📄 Pages: {}", outcome.pages);
            if outcome.thumbnails_skipped > 0 {
                warn!("{} cast portraits could not be loaded", outcome.thumbnails_skipped);
            }
            Ok(())
        }
        Err(e) => {
            error!("Aborting: {}", e);
            Err(e.into())
        }
    }
}

/// Paths dragged into a terminal often arrive quoted
fn strip_quotes(input: &str) -> &str {
    input.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn prompt_video_path() -> Result<PathBuf> {
    loop {
        let input: String = Input::new()
            .with_prompt("Enter the path to the video file")
            .interact_text()?;
        let path = PathBuf::from(strip_quotes(&input));
        if path.is_file() {
            return Ok(path);
        }
        warn!("The file {} does not exist. Please try again.", path.display());
    }
}

fn prompt_interval() -> Result<u64> {
    let interval: u64 = Input::new()
        .with_prompt("Enter the time interval between screenshots (in seconds)")
        .validate_with(|value: &u64| -> std::result::Result<(), &str> {
            if *value >= 1 {
                Ok(())
            } else {
                Err("interval must be at least 1 second")
            }
        })
        .interact_text()?;
    Ok(interval)
}
