use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::imageops::FilterType;
use string_knitter::{
    raster,
    verboser::{Message, Verboser},
    Algorithm, Config, DarknessMode, Selection,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path. Should be square; it is stretched otherwise.
    #[arg()]
    input: PathBuf,

    /// JSON configuration file. Flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of hooks around the circle.
    #[arg(short = 'k', long)]
    hooks: Option<usize>,

    /// Number of strings to wind.
    #[arg(short, long)]
    strings: Option<usize>,

    /// Diameter of the hook circle in millimetres.
    #[arg(long)]
    circle_diameter: Option<f32>,

    /// Diameter of the string in millimetres.
    #[arg(long)]
    string_diameter: Option<f32>,

    /// Side of the working image in pixels. Derived from the diameters when omitted.
    #[arg(short, long)]
    resolution: Option<u32>,

    /// How much a string lightens the pixels it covers.
    #[arg(long)]
    darkness: Option<DarknessKind>,

    /// Amount for the flat (1-255) or percentage (0-1] darkness modes.
    #[arg(long, requires = "darkness")]
    darkness_value: Option<f32>,

    /// Score candidate hooks on every core.
    #[arg(long)]
    parallel: bool,

    /// Save an intermediate result every N strings.
    #[arg(short, long)]
    interval: Option<usize>,

    /// Rendered result.
    #[arg(short, long, default_value = "result.png")]
    output: PathBuf,

    /// Also write the result as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Also write the winding instructions as text.
    #[arg(long)]
    instructions: Option<PathBuf>,

    /// Upscaling factor of the rendered PNG.
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// More logging; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DarknessKind {
    #[value(alias = "white")]
    Whiten,
    #[value(alias = "flatten")]
    Flat,
    #[value(alias = "per")]
    Percentage,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => Config::default(),
        };
        if let Some(hooks) = self.hooks {
            config.hook_count = hooks;
        }
        if let Some(strings) = self.strings {
            config.string_count = strings;
        }
        if let Some(diameter) = self.circle_diameter {
            config.circle_diameter = diameter;
        }
        if let Some(diameter) = self.string_diameter {
            config.string_diameter = diameter;
        }
        if self.parallel {
            config.selection = Selection::Parallel;
        }
        if let Some(kind) = self.darkness {
            config.darkness = match kind {
                DarknessKind::Whiten => DarknessMode::Whiten,
                DarknessKind::Flat => {
                    DarknessMode::Flat(self.darkness_value.unwrap_or(64.0).clamp(0.0, 255.0) as u8)
                }
                DarknessKind::Percentage => DarknessMode::Percentage(self.darkness_value.unwrap_or(0.75)),
            };
        }
        config.validate()?;
        Ok(config)
    }
}

/// Logs progress every `every` strings.
struct Progress {
    total: usize,
    every: usize,
}

impl Verboser for Progress {
    fn verbose(&mut self, message: Message) {
        match message {
            Message::CreatingHook(index) => tracing::trace!(index, "hook placed"),
            Message::Loading => tracing::info!("loading image"),
            Message::Computing(done) if done % self.every == 0 || done == self.total => {
                tracing::info!("{done}/{} strings", self.total)
            }
            Message::Computing(_) => {}
            Message::Saturated(string) => tracing::debug!(string, "string scored zero"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = args.config()?;
    let size = args.resolution.unwrap_or_else(|| config.resolution());
    let mut progress = Progress {
        total: config.string_count,
        every: (config.string_count / 20).max(1),
    };

    progress.verbose(Message::Loading);
    let field = raster::load_field(&args.input, size, FilterType::Triangle)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let mut algorithm = Algorithm::from_config(&config, field, &mut progress)?;

    if let Some(step) = args.interval.filter(|&step| step > 0) {
        let mut iteration = 1;
        let mut current = step;
        while current < config.string_count {
            algorithm.compute(current, &mut progress);
            let path = snapshot_path(&args.output, iteration);
            algorithm
                .snapshot()
                .save_image(&path, args.scale)
                .with_context(|| format!("saving {}", path.display()))?;
            current += step;
            iteration += 1;
        }
    }
    algorithm.compute(config.string_count, &mut progress);
    let computation = algorithm.into_computation();

    computation
        .save_image(&args.output, args.scale)
        .with_context(|| format!("saving {}", args.output.display()))?;
    if let Some(path) = &args.svg {
        computation
            .save_svg(path, 0.5)
            .with_context(|| format!("saving {}", path.display()))?;
    }
    if let Some(path) = &args.instructions {
        computation
            .save_instructions(path)
            .with_context(|| format!("saving {}", path.display()))?;
    }
    tracing::info!(
        output = %args.output.display(),
        saturated = computation.saturated_strings(),
        "done"
    );
    Ok(())
}

fn snapshot_path(output: &Path, iteration: usize) -> PathBuf {
    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("result");
    let extension = output.extension().and_then(|s| s.to_str()).unwrap_or("png");
    output.with_file_name(format!("{stem}_{iteration}.{extension}"))
}
