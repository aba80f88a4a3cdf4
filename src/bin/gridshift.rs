use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gridshift",
    version,
    about = "Generate seeded grid-shift reasoning tasks"
)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of tasks to generate.
    #[arg(long)]
    num_samples: Option<u64>,

    /// Output directory; tasks land in `<output>/<domain>_task/`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Base seed. Sample `i` uses `seed + i`.
    #[arg(long)]
    seed: Option<u64>,

    /// Skip ground-truth video generation.
    #[arg(long)]
    no_videos: bool,

    #[arg(long)]
    grid_size: Option<u32>,

    #[arg(long)]
    num_blocks: Option<usize>,

    /// Smallest per-task grid size. Any of the range flags turns on per-task sizes.
    #[arg(long)]
    grid_min: Option<u32>,

    /// Largest per-task grid size.
    #[arg(long)]
    grid_max: Option<u32>,

    /// Fewest blocks per task when sizes are drawn per task.
    #[arg(long)]
    blocks_min: Option<usize>,

    /// Most blocks per task as a fraction of the grid's cells.
    #[arg(long)]
    blocks_max_ratio: Option<f64>,

    /// Frame size as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_image_size)]
    image_size: Option<(u32, u32)>,

    /// Frame rate of the ground-truth video.
    #[arg(long)]
    fps: Option<u32>,

    /// Generate samples on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker count for `--parallel` (defaults to the number of CPUs).
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut cfg = match &cli.config {
        Some(path) => gridshift::GenerationConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => gridshift::GenerationConfig::default(),
    };
    apply_overrides(&mut cfg, &cli);

    let threading = gridshift::BatchThreading {
        parallel: cli.parallel,
        threads: cli.threads,
    };
    let report = gridshift::generate_dataset(&cfg, &threading).context("generation failed")?;

    eprintln!(
        "wrote {} task(s) ({} with video) to {} [seed {}]",
        report.written,
        report.videos,
        report.output_root.display(),
        report.base_seed
    );
    Ok(())
}

fn apply_overrides(cfg: &mut gridshift::GenerationConfig, cli: &Cli) {
    if let Some(n) = cli.num_samples {
        cfg.num_samples = n;
    }
    if let Some(dir) = &cli.output {
        cfg.output_dir = dir.clone();
    }
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    if cli.no_videos {
        cfg.emit_video = false;
    }
    // A fixed size on the command line wins over ranges loaded from the config file.
    if cli.grid_size.is_some() || cli.num_blocks.is_some() {
        cfg.random_sizes = None;
    }
    if let Some(n) = cli.grid_size {
        cfg.grid_size = n;
    }
    if let Some(n) = cli.num_blocks {
        cfg.num_blocks = n;
    }
    if cli.grid_min.is_some()
        || cli.grid_max.is_some()
        || cli.blocks_min.is_some()
        || cli.blocks_max_ratio.is_some()
    {
        let sizes = cfg.random_sizes.get_or_insert_with(Default::default);
        if let Some(n) = cli.grid_min {
            sizes.grid_min = n;
        }
        if let Some(n) = cli.grid_max {
            sizes.grid_max = n;
        }
        if let Some(n) = cli.blocks_min {
            sizes.blocks_min = n;
        }
        if let Some(r) = cli.blocks_max_ratio {
            sizes.blocks_max_ratio = r;
        }
    }
    if let Some(size) = cli.image_size {
        cfg.image_size = size;
    }
    if let Some(fps) = cli.fps {
        cfg.video_fps = fps;
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_image_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}
