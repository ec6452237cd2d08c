use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storyreel::{
    config::Config,
    error::ReelError,
    effects::{EffectDispatcher, EffectKind, EffectParams, EffectRegistry, ParamValue},
    pipeline::{ScenePipeline, Storyboard},
};

#[derive(Parser)]
#[command(
    name = "storyreel",
    version,
    about = "Animate still images into narrated story videos",
    long_about = "storyreel turns still images into short clips with procedural motion effects (zoom, pan, rotate, shake, colour shift, ripple, split slide, puzzle reveal) and stitches narrated scenes into one video."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available effects and their parameters
    Effects,

    /// Animate one still image into a silent clip
    Animate {
        /// Source image (PNG or JPEG)
        #[arg(short, long)]
        image: PathBuf,

        /// Output video file path
        #[arg(short, long)]
        output: PathBuf,

        /// Effect name, or "random" to pick one
        #[arg(short, long, default_value = "random")]
        effect: String,

        /// Clip length in seconds
        #[arg(short, long, default_value_t = 5.0)]
        duration: f64,

        /// Frame rate (defaults to the configured fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Seed for random effect choice and jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Effect parameter override, e.g. --param max_zoom=1.5
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Render a storyboard of narrated scenes into one video
    Render {
        /// Storyboard manifest (TOML with [[scenes]] text, image, audio)
        #[arg(short, long)]
        storyboard: PathBuf,

        /// Output video file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Build a storyboard manifest from a narration script and numbered assets
    Storyboard {
        /// Narration script (UTF-8 text)
        #[arg(short, long)]
        script: PathBuf,

        /// Directory holding 1.png, 2.png, ...
        #[arg(long)]
        images: PathBuf,

        /// Directory holding 1.wav, 2.wav, ...
        #[arg(long)]
        audio: PathBuf,

        /// Manifest to write
        #[arg(short, long, default_value = "storyboard.toml")]
        output: PathBuf,
    },

    /// Write the default configuration to a file
    InitConfig {
        #[arg(short, long, default_value = "storyreel.toml")]
        output: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<ReelError>() {
            Some(err) => eprintln!("❌ {}", err.user_message()),
            None => eprintln!("❌ {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::Effects => list_effects(&config),
        Commands::Animate {
            image,
            output,
            effect,
            duration,
            fps,
            seed,
            params,
        } => {
            if let Some(seed) = seed {
                config.render.seed = Some(seed);
            }
            let fps = fps.unwrap_or(config.render.fps);
            animate(config, &image, &output, &effect, duration, fps, &params)
        }
        Commands::Render { storyboard, output } => render(&config, &storyboard, &output),
        Commands::Storyboard {
            script,
            images,
            audio,
            output,
        } => {
            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            // Manifest paths resolve against the manifest's directory, so store absolute ones
            let images = std::fs::canonicalize(&images)
                .with_context(|| format!("images directory {}", images.display()))?;
            let audio = std::fs::canonicalize(&audio)
                .with_context(|| format!("audio directory {}", audio.display()))?;
            let storyboard = Storyboard::from_script(&text, &config.pipeline.delimiters, &images, &audio)?;
            storyboard.save_to_file(&output)?;
            println!("Wrote {} scenes to {}", storyboard.len(), output.display());
            Ok(())
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
            Ok(())
        }
    }
}

fn list_effects(config: &Config) -> Result<()> {
    let registry = EffectRegistry::with_enabled(&config.effects.enabled_kinds()?);

    for kind in registry.list_effects() {
        let effect = registry.build(kind, &config.effects.params_for(kind))?;
        let metadata = effect.metadata();
        let tag = if metadata.randomized { " (seeded)" } else { "" };

        println!("{}{}  [cost {:.1}]", kind, tag, metadata.performance_impact);
        println!("    {}", kind.description());
        for (name, help) in &metadata.parameters {
            println!("    --param {}=...  {}", name, help);
        }
    }
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, ParamValue)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), ParamValue::parse(value.trim())))
        }
        _ => bail!("invalid --param {:?}, expected KEY=VALUE", raw),
    }
}

fn animate(
    mut config: Config,
    image: &Path,
    output: &Path,
    effect: &str,
    duration: f64,
    fps: u32,
    params: &[String],
) -> Result<()> {
    config.validate()?;
    let dispatcher = EffectDispatcher::new(&config)?;
    let seed = dispatcher.seed_or_random();

    let kind: EffectKind = if effect.eq_ignore_ascii_case("random") {
        let mut rng = SmallRng::seed_from_u64(seed);
        dispatcher
            .registry()
            .choose(&mut rng)
            .context("no effects are enabled")?
    } else {
        dispatcher.resolve(effect)?
    };

    // Command-line overrides sit on top of the configured parameters
    let dispatcher = if params.is_empty() {
        dispatcher
    } else {
        let mut overrides = EffectParams::new();
        for raw in params {
            let (key, value) = parse_param(raw)?;
            overrides.insert(key, value);
        }
        let merged = config.effects.params_for(kind).merged(&overrides);
        config.effects.parameters.insert(kind.name().to_string(), merged);
        EffectDispatcher::new(&config)?
    };

    info!("Effect: {} (seed {})", kind, seed);
    let written = dispatcher.invoke_seeded(kind, image, duration, fps, output, seed)?;
    info!("Clip saved to {:?}", written);
    Ok(())
}

fn render(config: &Config, storyboard: &Path, output: &Path) -> Result<()> {
    let storyboard = Storyboard::from_file(storyboard)?;
    let pipeline = ScenePipeline::new(config)?;
    let report = pipeline.run(&storyboard, output)?;

    for scene in &report.skipped {
        println!("skipped scene {} ({}): {}", scene.index, scene.text, scene.reason);
    }
    println!(
        "{}: {} scenes, {:.1}s",
        report.output.display(),
        report.rendered.len(),
        report.duration()
    );
    Ok(())
}
