#![deny(unsafe_code)]
//! CLI binary for the backdrop animation.
//!
//! Subcommands:
//! - `render`: run the backdrop headless for N frames, write a PNG
//! - `list`: print available palettes and parameters

mod error;

use backdrop_core::{Palette, Rgba, Seed};
use backdrop_scene::headless::run_with_config;
use backdrop_scene::{BackdropConfig, RasterSurface};
use clap::{Parser, Subcommand};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "backdrop", about = "Particle and blob backdrop renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the backdrop for N frames and write a PNG snapshot.
    Render {
        /// Viewport width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: u32,

        /// Viewport height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: u32,

        /// Number of animation frames at 60 Hz.
        #[arg(short, long, default_value_t = 240)]
        frames: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Palette name (twilight, ocean, neon, ember, mono).
        #[arg(short, long)]
        palette: Option<String>,

        /// Backdrop parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Simulated scroll distance per frame, in pixels.
        #[arg(long, default_value_t = 4.0)]
        scroll_step: f64,

        /// Background color as CSS; transparent when omitted.
        #[arg(long)]
        background: Option<String>,

        /// Output file path.
        #[arg(short, long, default_value = "backdrop.png")]
        output: PathBuf,

        /// Replay a seed file instead of the flags above.
        #[arg(long, conflicts_with_all = ["width", "height", "frames", "seed", "params", "scroll_step"])]
        seed_file: Option<PathBuf>,

        /// Also write the run's seed as JSON for later replay.
        #[arg(long)]
        save_seed: Option<PathBuf>,
    },
    /// List available palettes and parameters.
    List,
}

fn load_seed(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("reading {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid seed file {}: {e}", path.display())))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let palettes = Palette::list_names();
            let schema = BackdropConfig::param_schema();
            if cli.json {
                let info = serde_json::json!({
                    "palettes": palettes,
                    "params": schema,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
                println!("Params:");
                if let Some(keys) = schema.as_object() {
                    for (key, spec) in keys {
                        let default = spec.get("default").map(|d| d.to_string());
                        println!("  {key} (default {})", default.as_deref().unwrap_or("-"));
                    }
                }
            }
        }
        Command::Render {
            width,
            height,
            frames,
            seed,
            palette,
            params,
            scroll_step,
            background,
            output,
            seed_file,
            save_seed,
        } => {
            let mut run_seed = match seed_file {
                Some(path) => load_seed(&path)?,
                None => {
                    let params: serde_json::Value = serde_json::from_str(&params)
                        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
                    if !params.is_object() {
                        return Err(CliError::Input("--params must be a JSON object".into()));
                    }
                    Seed {
                        width,
                        height,
                        params,
                        seed,
                        frames,
                        scroll_step,
                    }
                }
            };
            if let (Some(name), Some(obj)) = (palette, run_seed.params.as_object_mut()) {
                obj.insert("palette".into(), serde_json::Value::String(name));
            }

            let background = background
                .as_deref()
                .map(Rgba::parse)
                .transpose()?
                .unwrap_or(Rgba::TRANSPARENT);
            let config = BackdropConfig::from_json(&run_seed.params)?;
            let surface = RasterSurface::with_background(run_seed.viewport(), background);

            info!(
                width = run_seed.width,
                height = run_seed.height,
                frames = run_seed.frames,
                seed = run_seed.seed,
                "rendering"
            );
            let result = run_with_config(&run_seed, config, surface)?;
            backdrop_scene::snapshot::write_png(&result.surface, &output)?;

            if let Some(path) = &save_seed {
                let text = serde_json::to_string_pretty(&run_seed)?;
                std::fs::write(path, text)
                    .map_err(|e| CliError::Io(format!("writing {}: {e}", path.display())))?;
            }

            if cli.json {
                let blobs: Vec<_> = result
                    .transforms
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "index": t.index,
                            "transform": t.to_css(),
                        })
                    })
                    .collect();
                let info = serde_json::json!({
                    "width": run_seed.width,
                    "height": run_seed.height,
                    "frames": result.frames,
                    "seed": run_seed.seed,
                    "elapsed_ms": result.elapsed_ms,
                    "scroll_offset": result.scroll_offset,
                    "blobs": blobs,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered backdrop ({}x{}, {} frames, seed {}) -> {}",
                    run_seed.width,
                    run_seed.height,
                    result.frames,
                    run_seed.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
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
