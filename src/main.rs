//! hydra - load a core library and run it headless
//!
//! Main entry point for the command line frontend.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use hc_abi::CoreInfo;
use hc_core::{logging, Config};
use hc_host::{CoreLibrary, CoreRunner};

#[derive(Parser, Debug)]
#[command(name = "hydra", about = "Load a hydra core, print its info and run it headless")]
struct Args {
    /// Core library, as a path or a file name inside the configured cores directory
    core: PathBuf,

    /// Content to load, as a path or a file name inside the configured content directory
    content: Option<PathBuf>,

    /// Frames to run before quitting
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Configuration file (defaults to the per-user config)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print core info as JSON
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Pace frames to the core's frame rate
    #[arg(long, action = clap::ArgAction::SetTrue)]
    paced: bool,
}

/// `path` as given when it exists, otherwise looked up in `dir`
fn locate(path: &Path, dir: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

fn print_info(info: &CoreInfo, as_json: bool) -> Result<()> {
    if as_json {
        let content: Vec<_> = info
            .loadable_content
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "description": c.description,
                    "extensions": c.extensions,
                })
            })
            .collect();
        let value = json!({
            "core_name": info.core_name,
            "core_version": info.core_version,
            "system_name": info.system_name,
            "author": info.author,
            "description": info.description,
            "website": info.website,
            "license": info.license,
            "loadable_content": content,
            "icon": info.icon.as_ref().map(|i| json!({ "width": i.width, "height": i.height })),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} {}", info.core_name, info.core_version);
    println!("  System:  {}", info.system_name);
    println!("  Author:  {}", info.author);
    println!("  License: {}", info.license);
    if !info.description.is_empty() {
        println!("  {}", info.description);
    }
    for content in &info.loadable_content {
        println!(
            "  Loads {} ({}): {}",
            content.name, content.extensions, content.description
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    logging::init(config.debug.log_level);

    tracing::info!("Starting hydra");

    let core_path = locate(&args.core, &config.general.cores_dir);
    let library = CoreLibrary::open(&core_path)
        .with_context(|| format!("loading core {}", core_path.display()))?;
    print_info(library.core_info(), args.json)?;

    let mut runner = CoreRunner::new(library, &config).context("creating core")?;
    if let Some(content) = &args.content {
        let content_path = locate(content, &config.general.content_dir);
        runner
            .load_content(&content_path)
            .with_context(|| format!("loading content {}", content_path.display()))?;
    }

    runner.start().context("starting core")?;
    // Nothing plays the audio, it is drained and counted
    let mut ran = 0;
    let mut audio_bytes = 0;
    for _ in 0..args.frames {
        ran += runner.run_frames(1, args.paced)?;
        audio_bytes += runner.drain_audio().len();
    }
    tracing::info!(
        "Ran {} frames, {} video frames received, {} bytes of audio",
        ran,
        runner.frames_received(),
        audio_bytes
    );

    runner.quit().context("quitting core")?;
    Ok(())
}
