mod blossom;
mod config;
mod error;
mod export;
mod garden;
mod grammar;
mod growth;
mod help;
mod live;
mod logging;
mod plant;
mod selector;
mod settings;
mod stroke;
mod surface;
mod terminal;
mod turtle;

use clap::{Parser, Subcommand};
use config::{GardenConfig, GrowConfig, SessionConfig};
use error::GardenError;
use logging::LogTarget;
use plant::PlantKind;
use settings::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "watergarden")]
#[command(author = "watergarden contributors")]
#[command(version)]
#[command(about = "Watercolor L-system plants, as images or a scrolling terminal garden", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow plants into a PNG (or dump the growth plan as JSON)
    Grow {
        /// Plant kind (random when omitted)
        #[arg(short, long, value_enum)]
        kind: Option<PlantKind>,

        /// Origin x in pixels (default: horizontal center)
        #[arg(short)]
        x: Option<f32>,

        /// Origin y in pixels (default: near the bottom)
        #[arg(short)]
        y: Option<f32>,

        /// Canvas width in pixels
        #[arg(short = 'W', long, default_value = "800")]
        width: u32,

        /// Canvas height in pixels
        #[arg(short = 'H', long, default_value = "600")]
        height: u32,

        /// Extra plants at random origins
        #[arg(short = 'n', long, default_value = "0")]
        count: usize,

        /// Output PNG path
        #[arg(short, long, default_value = "plant.png")]
        out: PathBuf,

        /// Print the growth plan as JSON instead of painting
        #[arg(long)]
        json: bool,

        /// Leave the background transparent
        #[arg(long)]
        transparent: bool,

        /// Fewer grammar iterations per plant
        #[arg(long)]
        low_power: bool,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run the garden: interactive in the terminal, or headless with --out
    Garden {
        /// Render the whole page to this PNG instead of opening the terminal garden
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Page width in pixels (headless only)
        #[arg(short = 'W', long, default_value = "1200")]
        width: u32,

        /// Viewport height in pixels (headless only)
        #[arg(short = 'H', long, default_value = "900")]
        height: u32,

        /// Frame delay in seconds
        #[arg(short, long, default_value = "0.03")]
        time: f32,

        /// Smaller plants and a shorter history
        #[arg(long)]
        low_power: bool,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn log_target(settings: &Settings, interactive: bool) -> LogTarget<'_> {
    match (&settings.log.file, interactive) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    }
}

fn main() -> Result<(), GardenError> {
    let cli = Cli::parse();

    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Ignoring {}: {}", Settings::config_path().display(), e);
        Settings::default()
    });

    let interactive = matches!(&cli.command, Commands::Garden { out: None, .. });
    let level = settings.log.level.as_deref().unwrap_or("info");
    logging::init(level, log_target(&settings, interactive))?;

    match cli.command {
        Commands::Grow {
            kind,
            x,
            y,
            width,
            height,
            count,
            out,
            json,
            transparent,
            low_power,
            seed,
        } => {
            let width = width.max(1);
            let height = height.max(1);
            let origin = match (x, y) {
                (None, None) => None,
                (x, y) => Some((
                    x.unwrap_or(width as f32 / 2.0),
                    y.unwrap_or(height as f32 * 0.9),
                )),
            };
            let config = GrowConfig {
                kind,
                origin,
                width,
                height,
                extra: count,
                out,
                json,
                paper: (!transparent).then(|| settings.garden.paper()),
                seed,
                low_power: low_power || settings.garden.low_power.unwrap_or(false),
            };
            export::run(config)?;
        }
        Commands::Garden {
            out,
            width,
            height,
            time,
            low_power,
            seed,
        } => {
            let config = GardenConfig {
                out,
                width: width.max(1),
                height: height.max(1),
                time_step: time,
                seed,
                pixel_scale: settings.garden.pixel_scale.unwrap_or(4).clamp(1, 16),
                paper: settings.garden.paper(),
                session: SessionConfig::from_settings(&settings, low_power),
            };
            live::run(config)?;
        }
    }

    Ok(())
}
