#![deny(unsafe_code)]
//! CLI binary for the island-zoom frame generators.
//!
//! Subcommands:
//! - `render <engine>`: run an engine for N frames and write a PNG per frame
//! - `list`: print available engines, palettes and noise backends

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use island_zoom_core::{Engine, Palette, Seed};
use island_zoom_engines::snapshot::{frame_file_name, write_frame};
use island_zoom_engines::{EngineKind, NoiseBackend};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// File written next to the frames describing the run.
const SEED_FILE: &str = "seed.json";

#[derive(Parser)]
#[command(name = "island-zoom", about = "Infinite zoom over procedural islands")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an engine and write one PNG per frame.
    Render {
        /// Engine name ("island" or "noise").
        #[arg(required_unless_present = "replay")]
        engine: Option<String>,

        /// Frame width in pixels.
        #[arg(short = 'W', long, default_value_t = 256)]
        width: usize,

        /// Frame height in pixels.
        #[arg(short = 'H', long, default_value_t = 256)]
        height: usize,

        /// Number of frames to write.
        #[arg(short, long, default_value_t = 120)]
        steps: usize,

        /// Seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Palette name (island, classic, grayscale).
        #[arg(short, long, default_value = "island")]
        palette: String,

        /// Directory the frames and seed.json are written to.
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Noise backend (builtin, clumpy).
        #[arg(long, default_value = "builtin")]
        noise: String,

        /// Path to the clumpy executable.
        #[arg(long)]
        clumpy: Option<PathBuf>,

        /// Integer nearest-neighbour upscale factor for written frames.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: u32,

        /// Replay a run from a seed.json; overrides engine, size, seed,
        /// steps, params and noise.
        #[arg(long)]
        replay: Option<PathBuf>,
    },
    /// List available engines, palettes and noise backends.
    List,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Resolves the run description from `--replay` or the individual flags.
#[allow(clippy::too_many_arguments)]
fn resolve_seed(
    replay: Option<&Path>,
    engine: Option<String>,
    width: usize,
    height: usize,
    steps: usize,
    seed: u64,
    params: &str,
    noise: String,
) -> Result<Seed, CliError> {
    if let Some(path) = replay {
        return Ok(Seed::load(path)?);
    }
    let engine = engine.ok_or_else(|| CliError::Input("missing engine name".into()))?;
    let mut run = Seed::new(&engine, width, height, seed);
    run.params = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    run.steps = steps;
    run.noise = noise;
    run.validate()?;
    Ok(run)
}

/// Writes `run.steps` frames of the engine into `output` and returns the
/// paths written.
fn render_frames(
    run: &Seed,
    palette: &Palette,
    output: &Path,
    scale: u32,
    clumpy: Option<&Path>,
) -> Result<Vec<PathBuf>, CliError> {
    let mut engine = EngineKind::from_seed(run, clumpy)?;
    fs::create_dir_all(output)
        .map_err(|e| CliError::Io(format!("{}: {e}", output.display())))?;
    run.save(&output.join(SEED_FILE))?;

    let mut frames = Vec::with_capacity(run.steps);
    for index in 0..run.steps {
        if index > 0 {
            engine.step()?;
        }
        let path = output.join(frame_file_name(&run.engine, index));
        write_frame(&engine, palette, scale, &path)?;
        frames.push(path);
    }
    info!("wrote {} frames to {}", frames.len(), output.display());
    Ok(frames)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            let palettes = Palette::list_names();
            let backends = NoiseBackend::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "engines": engines,
                    "palettes": palettes,
                    "noise": backends,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
                println!("Noise backends:");
                println!("  {}", backends.join(", "));
            }
        }
        Command::Render {
            engine,
            width,
            height,
            steps,
            seed,
            palette,
            output,
            params,
            noise,
            clumpy,
            scale,
            replay,
        } => {
            let palette =
                Palette::from_name(&palette).map_err(|e| CliError::Input(e.to_string()))?;
            let run = resolve_seed(
                replay.as_deref(),
                engine,
                width,
                height,
                steps,
                seed,
                &params,
                noise,
            )?;

            let frames = render_frames(&run, &palette, &output, scale, clumpy.as_deref())?;

            if cli.json {
                let info = serde_json::json!({
                    "engine": run.engine,
                    "width": run.width,
                    "height": run.height,
                    "steps": run.steps,
                    "seed": run.seed,
                    "noise": run.noise,
                    "output": output.display().to_string(),
                    "frames": frames.len(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {} frames, seed {}, {} noise) -> {}",
                    run.engine,
                    run.width,
                    run.height,
                    run.steps,
                    run.seed,
                    run.noise,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
