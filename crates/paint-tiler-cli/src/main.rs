use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use image::{DynamicImage, ImageReader};
use paint_tiler_core::{
    CanvasType, IdentityAssigner, RunContext, TilePlan, TilerConfig, export_plan_with,
    export_to_json, name_root_from_path, plan_tiles, plan_to_json, read_descriptor,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "paint-tiler",
    about = "Split an image into painting canvases (BMP + .paint)",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split an image into tiles and write .bmp + .paint files
    Split(SplitArgs),
    /// Plan only: print the tile layout without writing files
    Plan(PlanArgs),
    /// Decode a .paint descriptor and print its fields
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
struct SplitArgs {
    // Input/Output
    /// Path to input image (bmp, png, jpeg)
    #[arg(short, long, help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory for tiles and .paint files
    #[arg(short, long, default_value = "tiles", help_heading = "Input/Output")]
    out: PathBuf,
    /// YAML config file path (its values override the flags below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Painting
    /// Author name for .paint files
    #[arg(long, default_value = "Unknown", help_heading = "Painting")]
    author: String,
    /// Title for .paint files
    #[arg(long, default_value = "Untitled", help_heading = "Painting")]
    title: String,

    // Limits
    /// Reject images wider or taller than this many pixels (multiple of 16)
    #[arg(long, help_heading = "Limits")]
    max_dimension: Option<u32>,

    // Export
    /// Write a JSON manifest of exported tiles to this file
    #[arg(long, help_heading = "Export")]
    manifest: Option<PathBuf>,
    /// Export tiles in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    parallel: bool,
    /// Dry run: plan and log tiles but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
}

#[derive(Parser, Debug, Clone)]
struct PlanArgs {
    /// Path to input image (bmp, png, jpeg)
    #[arg(short, long)]
    input: PathBuf,
    /// Reject images wider or taller than this many pixels (multiple of 16)
    #[arg(long)]
    max_dimension: Option<u32>,
    /// Output format: text | json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Parser, Debug, Clone)]
struct InspectArgs {
    /// .paint file to decode
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Split(args) => run_split(args, cli.progress && !cli.quiet),
        Commands::Plan(args) => run_plan(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn run_split(cli: &SplitArgs, show_progress: bool) -> anyhow::Result<()> {
    let base = TilerConfig {
        author: cli.author.clone(),
        title: cli.title.clone(),
        out_dir: cli.out.clone(),
        max_dimension: cli.max_dimension,
        parallel: cli.parallel,
    };
    // Config file values take precedence over flags
    let cfg = if let Some(path) = &cli.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_tiler_config(base)
    } else {
        base
    };

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate()?;

    let img = load_image(&cli.input)?;
    let name_root = name_root_from_path(&cli.input);
    let plan = plan_tiles(&img, &name_root, &cfg)
        .with_context(|| format!("plan tiles for {}", cli.input.display()))?;
    info!(summary = %plan.stats().summary(), "planned");

    if cli.dry_run {
        for tile in &plan.tiles {
            let p = &tile.placement;
            info!(
                file = %tile.file_base,
                ct = p.canvas.code,
                row = p.row,
                col = p.col,
                "would export"
            );
        }
        return Ok(());
    }

    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("create out_dir {}", cfg.out_dir.display()))?;

    let ctx = RunContext::new(&cfg, name_root);
    let mut assigner = ctx.identity_assigner();
    let exported = if cfg.parallel {
        export_parallel(&ctx, &plan, &mut assigner)?
    } else {
        export_with_progress(&ctx, &plan, &mut assigner, show_progress)?
    };
    info!(
        tiles = exported.len(),
        out_dir = %cfg.out_dir.display(),
        "export complete"
    );

    if let Some(manifest_path) = &cli.manifest {
        let value = export_to_json(&plan, &exported);
        fs::write(manifest_path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("write {}", manifest_path.display()))?;
        info!(?manifest_path, "manifest written");
    }
    Ok(())
}

fn export_with_progress(
    ctx: &RunContext,
    plan: &TilePlan,
    assigner: &mut IdentityAssigner,
    progress: bool,
) -> anyhow::Result<Vec<paint_tiler_core::ExportedTile>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(plan.tiles.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} exporting {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let exported = export_plan_with(ctx, plan, assigner, |tile| {
        if let Some(b) = &bar {
            b.set_message(tile.file_base.clone());
            b.inc(1);
        }
    })
    .with_context(|| format!("export tiles to {}", ctx.out_dir.display()))?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(exported)
}

#[cfg(feature = "parallel")]
fn export_parallel(
    ctx: &RunContext,
    plan: &TilePlan,
    assigner: &mut IdentityAssigner,
) -> anyhow::Result<Vec<paint_tiler_core::ExportedTile>> {
    paint_tiler_core::export_plan_parallel(ctx, plan, assigner)
        .with_context(|| format!("export tiles to {}", ctx.out_dir.display()))
}

#[cfg(not(feature = "parallel"))]
fn export_parallel(
    ctx: &RunContext,
    plan: &TilePlan,
    assigner: &mut IdentityAssigner,
) -> anyhow::Result<Vec<paint_tiler_core::ExportedTile>> {
    warn!("built without feature `parallel`; exporting sequentially");
    export_with_progress(ctx, plan, assigner, false)
}

fn run_plan(args: &PlanArgs) -> anyhow::Result<()> {
    let cfg = TilerConfig {
        max_dimension: args.max_dimension,
        ..Default::default()
    };
    let img = load_image(&args.input)?;
    let name_root = name_root_from_path(&args.input);
    let plan = plan_tiles(&img, &name_root, &cfg)
        .with_context(|| format!("plan tiles for {}", args.input.display()))?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&plan_to_json(&plan))?),
        _ => {
            for tile in &plan.tiles {
                let p = &tile.placement;
                println!(
                    "{} ct={} size={}x{} cell=({}, {})",
                    tile.file_base, p.canvas.code, p.canvas.px_w, p.canvas.px_h, p.row, p.col
                );
            }
            println!("{}", plan.stats().summary());
        }
    }
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let desc = read_descriptor(&args.path)
        .with_context(|| format!("read descriptor {}", args.path.display()))?;
    let canvas = u8::try_from(desc.ct)
        .ok()
        .and_then(CanvasType::from_code);
    let size = canvas
        .map(|c| format!("{}x{}", c.px_w, c.px_h))
        .unwrap_or_else(|| "unknown".into());
    println!("generation: {}", desc.generation);
    println!("ct:         {} ({})", desc.ct, size);
    println!("pixels:     {}", desc.pixels.len());
    println!("v:          {}", desc.v);
    println!("author:     {}", desc.author);
    println!("title:      {}", desc.title);
    println!("name:       {}", desc.name);
    if let Some(c) = canvas {
        let expected = c.area() as usize;
        if desc.pixels.len() != expected {
            warn!(
                expected,
                actual = desc.pixels.len(),
                "pixel count does not match canvas type"
            );
        }
    }
    Ok(())
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)
        .with_context(|| format!("open {}", p.display()))?
        .with_guessed_format()
        .with_context(|| format!("detect format of {}", p.display()))?
        .decode()
        .with_context(|| format!("decode {}", p.display()))?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    author: Option<String>,
    title: Option<String>,
    out: Option<PathBuf>,
    max_dimension: Option<u32>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_tiler_config(self, mut cfg: TilerConfig) -> TilerConfig {
        if let Some(v) = self.author {
            cfg.author = v;
        }
        if let Some(v) = self.title {
            cfg.title = v;
        }
        if let Some(v) = self.out {
            cfg.out_dir = v;
        }
        if let Some(v) = self.max_dimension {
            cfg.max_dimension = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        cfg
    }
}
