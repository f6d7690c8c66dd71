use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "trailplot", version)]
struct Cli {
    /// JSON config with overrides of the built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the four random-walk GIFs.
    Synthetic(SyntheticArgs),
    /// Render the storm-track GIF from a storms CSV.
    Storm(StormArgs),
    /// Render a single frame of one recipe as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SyntheticArgs {
    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Random seed (overrides the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Number of points (overrides the config).
    #[arg(long)]
    count: Option<usize>,
}

#[derive(Parser, Debug)]
struct StormArgs {
    /// Storms CSV (overrides the config).
    #[arg(long = "data")]
    data_path: Option<PathBuf>,

    /// GeoJSON borders (overrides the config).
    #[arg(long = "borders")]
    borders_path: Option<PathBuf>,

    /// Storm name (overrides the config).
    #[arg(long)]
    name: Option<String>,

    /// Season year (overrides the config).
    #[arg(long)]
    year: Option<i32>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Recipe to render.
    #[arg(long, value_enum, default_value_t = Recipe::Basic)]
    recipe: Recipe,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Recipe {
    Basic,
    Smooth,
    Labels,
    Shadow,
    Storm,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Synthetic(args) => cmd_synthetic(cfg, args),
        Command::Storm(args) => cmd_storm(cfg, args),
        Command::Frame(args) => cmd_frame(cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<trailplot::TutorialConfig> {
    match path {
        Some(p) => Ok(trailplot::TutorialConfig::from_path(p)?),
        None => Ok(trailplot::TutorialConfig::default()),
    }
}

fn cmd_synthetic(mut cfg: trailplot::TutorialConfig, args: SyntheticArgs) -> anyhow::Result<()> {
    if let Some(seed) = args.seed {
        cfg.walk.seed = seed;
    }
    if let Some(count) = args.count {
        cfg.walk.count = count;
    }
    for path in trailplot::tutorial::render_all_synthetic(&cfg, &args.out_dir)? {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_storm(mut cfg: trailplot::TutorialConfig, args: StormArgs) -> anyhow::Result<()> {
    if let Some(p) = args.data_path {
        cfg.storm.data_path = p;
    }
    if args.borders_path.is_some() {
        cfg.storm.borders_path = args.borders_path;
    }
    if let Some(name) = args.name {
        cfg.storm.name = name;
    }
    if let Some(year) = args.year {
        cfg.storm.year = year;
    }
    let path = trailplot::tutorial::render_storm(&cfg, &args.out_dir)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_frame(cfg: trailplot::TutorialConfig, args: FrameArgs) -> anyhow::Result<()> {
    use trailplot::tutorial;

    let spec = match args.recipe {
        Recipe::Basic => tutorial::synthetic_basic(&cfg)?,
        Recipe::Smooth => tutorial::synthetic_smooth(&cfg)?,
        Recipe::Labels => tutorial::synthetic_labels(&cfg)?,
        Recipe::Shadow => tutorial::synthetic_shadow(&cfg)?,
        Recipe::Storm => {
            let table = trailplot::StormTable::from_path(&cfg.storm.data_path)?;
            let borders = cfg
                .storm
                .borders_path
                .as_ref()
                .map(trailplot::Basemap::from_path)
                .transpose()?;
            tutorial::katrina(&cfg, &table, borders)?
        }
    };

    let mut backend = trailplot::create_backend(
        trailplot::BackendKind::Cpu,
        &trailplot::RenderSettings::default(),
    )?;
    let frame = trailplot::render_frame(
        &spec,
        trailplot::FrameIndex(args.frame),
        backend.as_mut(),
    )?;
    trailplot::write_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
