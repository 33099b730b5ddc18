use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use kiosk_capture::foundation::core::parse_dimensions;
use kiosk_capture::placement::screen_from_dimensions;

#[derive(Parser, Debug)]
#[command(name = "kiosk", version)]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one photographed sheet through the capture pipeline.
    Process(ProcessArgs),
    /// Compute a spawn position and scale for an artifact.
    Place(PlaceArgs),
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Photo of the drawing sheet.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG for the masked drawing.
    #[arg(long)]
    out: PathBuf,

    /// Output PNG for the name strip, written only when one was extracted.
    #[arg(long)]
    name_out: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mask directory (overrides config).
    #[arg(long)]
    masks: Option<PathBuf>,

    /// Theme (overrides config).
    #[arg(long)]
    theme: Option<kiosk_capture::Theme>,

    /// Scene size as WIDTHxHEIGHT (overrides config).
    #[arg(long)]
    screen: Option<String>,

    /// Seed for placement draws.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    #[arg(long, default_value_t = kiosk_capture::Theme::Default)]
    theme: kiosk_capture::Theme,

    /// Scene size as WIDTHxHEIGHT.
    #[arg(long)]
    screen: String,

    /// Artifact size as WIDTHxHEIGHT.
    #[arg(long)]
    artifact: String,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(serde::Serialize)]
struct Report<'a> {
    theme: kiosk_capture::Theme,
    drawing: &'a Path,
    name: Option<&'a Path>,
    placement: kiosk_capture::PlacementResult,
    diagnostics: &'a kiosk_capture::Diagnostics,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);
    match cli.cmd {
        Command::Process(args) => cmd_process(args),
        Command::Place(args) => cmd_place(args),
    }
}

fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ProcessArgs) -> anyhow::Result<kiosk_capture::KioskConfig> {
    let mut config = match &args.config {
        Some(path) => kiosk_capture::KioskConfig::from_path(path)?,
        None => kiosk_capture::KioskConfig::default(),
    };
    if let Some(masks) = &args.masks {
        config.masks_dir = masks.clone();
    }
    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    if let Some(screen) = &args.screen {
        config.screen = screen_from_dimensions(parse_dimensions(screen)?)?;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_process(args: ProcessArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let pipeline = kiosk_capture::FramePipeline::from_config(&config);
    let station = match args.seed {
        Some(seed) => kiosk_capture::CaptureStation::with_seed(pipeline, &config, seed),
        None => kiosk_capture::CaptureStation::new(pipeline, &config),
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start runtime")?;
    let delivery = rt.block_on(async {
        let upload = kiosk_capture::Upload::from_path(&args.in_path).await?;
        station.capture_upload(upload).await.into_delivery()
    })?;

    write_png(&args.out, &delivery.artifact.drawing)?;
    let name_path = match (&args.name_out, &delivery.artifact.name) {
        (Some(path), Some(name)) => {
            write_png(path, name)?;
            Some(path.as_path())
        }
        _ => None,
    };

    let report = Report {
        theme: config.theme,
        drawing: &args.out,
        name: name_path,
        placement: delivery.placement,
        diagnostics: &delivery.diagnostics,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_place(args: PlaceArgs) -> anyhow::Result<()> {
    let screen = screen_from_dimensions(parse_dimensions(&args.screen)?)?;
    let artifact = parse_dimensions(&args.artifact)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let placement = kiosk_capture::place(args.theme, screen, artifact, &mut rng);
    println!("{}", serde_json::to_string_pretty(&placement)?);
    Ok(())
}

fn write_png(path: &Path, frame: &kiosk_capture::RawFrame) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        frame.as_bytes(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
