use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::{Rgba, RgbaImage};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{error, info, warn};
use treepack_core::{
    Layout, LayoutItem, MAX_REPEAT, PackMode, PackerConfig, SortOrder, pack_layout_items,
};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "treepack",
    about = "Pack blocks or images into a single sprite sheet",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
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
    /// Pack blocks or images and write metadata plus a PNG (sheet or preview)
    Pack(PackArgs),
    /// Layout-only export (no PNG): compute placements and export JSON
    Layout(PackArgs),
    /// Simple timing bench on a generated random block set
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Block list (text `WxH[xN]`, .json or .yaml), an image file, or a directory of images
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name (files will be name.png/.json)
    #[arg(short, long, default_value = "sheet", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides layout-related options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob) for directory input
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob) for directory input
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Packer: fixed | growing
    #[arg(long, value_parser = ["fixed", "growing"], default_value = "growing", help_heading = "Layout")]
    mode: String,
    /// Bin width (fixed mode)
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    width: u32,
    /// Bin height (fixed mode)
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    height: u32,
    /// Sort order: maxside|area|height|width|name|none
    #[arg(long, default_value = "maxside", help_heading = "Layout")]
    sort: String,
    /// Try every sort order and keep the best layout
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    auto: bool,
    /// Evaluate auto candidates in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,
    /// Shuffle the input with this seed instead of sorting
    #[arg(long, help_heading = "Layout")]
    shuffle_seed: Option<u64>,

    // Export
    /// Metadata format: json-array | json (alias) | json-hash
    #[arg(long, default_value = "json-array", help_heading = "Export")]
    metadata: String,
    /// Layout-only: compute placements and export metadata (no PNG)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    layout_only: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Number of random blocks
    #[arg(long, default_value_t = 1000)]
    count: usize,
    /// Smallest block side
    #[arg(long, default_value_t = 8)]
    min_size: u32,
    /// Largest block side
    #[arg(long, default_value_t = 128)]
    max_size: u32,
    /// Packer: fixed | growing
    #[arg(long, value_parser = ["fixed", "growing"], default_value = "growing")]
    mode: String,
    /// Bin width/height for fixed mode
    #[arg(long, default_value_t = 2048)]
    size: u32,
    /// Sort order: maxside|area|height|width|name|none
    #[arg(long, default_value = "maxside")]
    sort: String,
    /// RNG seed for the generated blocks
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => {
            let mut a = args.clone();
            a.layout_only = true;
            run_pack(&a, false)
        }
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = PackerConfig {
        mode: cli.mode.parse()?,
        width: cli.width,
        height: cli.height,
        sort_order: cli.sort.parse()?,
        auto: cli.auto,
        parallel: cli.parallel,
    };
    // Config file overrides layout-related options en bloc
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_packer_config(cfg)?;
    }
    if cli.shuffle_seed.is_some() {
        if cfg.auto {
            warn!("--shuffle-seed disables auto mode");
        }
        cfg.auto = false;
        cfg.sort_order = SortOrder::None;
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let Input { mut items, images } = load_input(cli, show_progress)?;
    info!(count = items.len(), "loaded blocks");
    if let Some(seed) = cli.shuffle_seed {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        items.shuffle(&mut rng);
    }

    let start = Instant::now();
    let layout = pack_layout_items(items, cfg)?;
    let elapsed = start.elapsed();
    for key in &layout.unplaced {
        warn!(key = %key, "block did not fit");
    }
    let stats = layout.stats();
    info!(
        width = layout.width,
        height = layout.height,
        placed = stats.num_placed,
        unplaced = stats.num_unplaced,
        time = %fmt_dur(elapsed),
        "layout computed"
    );

    if cli.dry_run {
        println!(
            "{}x{} {} time={}",
            layout.width,
            layout.height,
            stats.summary(),
            fmt_dur(elapsed)
        );
        return Ok(());
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;

    let json_path = cli.out_dir.join(format!("{}.json", cli.name));
    let json_value = match cli.metadata.as_str() {
        "json-array" | "json" => treepack_core::to_json_array(&layout),
        "json-hash" => treepack_core::to_json_hash(&layout),
        other => anyhow::bail!("unknown metadata format: {}", other),
    };
    fs::write(&json_path, serde_json::to_string_pretty(&json_value)?)
        .with_context(|| format!("write {}", json_path.display()))?;
    info!(?json_path, "metadata written");

    if !cli.layout_only {
        if layout.width == 0 || layout.height == 0 {
            warn!("layout is empty; skipping PNG");
        } else {
            ensure_png_size(&layout)?;
            let png = match &images {
                Some(paths) => {
                    let bar = if show_progress {
                        Some(progress_bar(layout.placements.len(), "composing")?)
                    } else {
                        None
                    };
                    let sheet = compose_sheet(&layout, paths, bar.as_ref());
                    if let Some(b) = &bar {
                        b.finish_and_clear();
                    }
                    sheet
                }
                None => render_preview(&layout),
            };
            let png_path = cli.out_dir.join(format!("{}.png", cli.name));
            png.save(&png_path)
                .with_context(|| format!("write {}", png_path.display()))?;
            info!(?png_path, "png written");
        }
    }

    if let Some(stats_path) = &cli.export_stats {
        fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
            .with_context(|| format!("write {}", stats_path.display()))?;
        info!(?stats_path, "stats exported");
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    anyhow::ensure!(b.min_size <= b.max_size, "--min-size must not exceed --max-size");
    let mut rng = rand::rngs::StdRng::seed_from_u64(b.seed);
    let items: Vec<LayoutItem> = (0..b.count)
        .map(|i| {
            LayoutItem::new(
                format!("b{}", i),
                rng.gen_range(b.min_size..=b.max_size),
                rng.gen_range(b.min_size..=b.max_size),
            )
        })
        .collect();
    let cfg = PackerConfig {
        mode: b.mode.parse()?,
        width: b.size,
        height: b.size,
        sort_order: b.sort.parse()?,
        ..Default::default()
    };
    let start = Instant::now();
    let layout = pack_layout_items(items, cfg)?;
    let dur = start.elapsed();
    let stats = layout.stats();
    println!(
        "size={}x{} placed={}/{} occupancy={:.2}% time={}",
        layout.width,
        layout.height,
        stats.num_placed,
        stats.num_blocks,
        stats.occupancy * 100.0,
        fmt_dur(dur)
    );
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

// ---------- input ----------

struct Input {
    items: Vec<LayoutItem>,
    /// Key -> source image, when packing images.
    images: Option<HashMap<String, PathBuf>>,
}

#[derive(Deserialize, Debug)]
struct BlockEntry {
    key: Option<String>,
    w: u32,
    h: u32,
    #[serde(default = "default_num")]
    num: usize,
}

fn default_num() -> usize {
    1
}

fn load_input(cli: &PackArgs, progress: bool) -> anyhow::Result<Input> {
    let path = &cli.input;
    if path.is_dir() || is_image(path) {
        let paths = gather_paths(path, &cli.include, &cli.exclude)?;
        return read_image_sizes(path, &paths, progress);
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("read blocks {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase());
    let items = match ext.as_deref() {
        Some("json") => expand_entries(serde_json::from_str(&text)?)?,
        Some("yaml") | Some("yml") => expand_entries(serde_yaml::from_str(&text)?)?,
        _ => treepack_core::parse_blocks(&text)
            .with_context(|| format!("parse blocks {}", path.display()))?,
    };
    Ok(Input {
        items,
        images: None,
    })
}

fn expand_entries(entries: Vec<BlockEntry>) -> anyhow::Result<Vec<LayoutItem>> {
    let mut items = Vec::with_capacity(entries.len());
    for (i, e) in entries.into_iter().enumerate() {
        anyhow::ensure!(e.num > 0, "entry {} has num = 0", i + 1);
        anyhow::ensure!(
            e.num <= MAX_REPEAT,
            "entry {} has num = {} (at most {})",
            i + 1,
            e.num,
            MAX_REPEAT
        );
        let key = e.key.unwrap_or_else(|| format!("b{}", i + 1));
        if e.num == 1 {
            items.push(LayoutItem::new(key, e.w, e.h));
        } else {
            items.extend((0..e.num).map(|n| LayoutItem::new(format!("{}_{}", key, n), e.w, e.h)));
        }
    }
    Ok(items)
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && is_image(p) && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if exclude.is_some_and(|ex| ex.is_match(&s)) {
        return true;
    }
    include.is_some_and(|inc| !inc.is_match(&s))
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn progress_bar(len: usize, verb: &str) -> anyhow::Result<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    let b = ProgressBar::new(len as u64);
    b.set_style(ProgressStyle::with_template(&format!(
        "{{spinner:.green}} {verb} {{pos}}/{{len}} [{{elapsed_precise}}] {{wide_msg}}"
    ))?);
    Ok(b)
}

/// Reads image headers only; pixels are decoded later when composing the sheet.
fn read_image_sizes(root: &Path, paths: &[PathBuf], progress: bool) -> anyhow::Result<Input> {
    let bar = if progress {
        Some(progress_bar(paths.len(), "reading")?)
    } else {
        None
    };
    let mut items = Vec::with_capacity(paths.len());
    let mut images = HashMap::with_capacity(paths.len());
    for p in paths {
        if let Some(b) = &bar {
            b.set_message(p.file_name().and_then(|s| s.to_str()).unwrap_or("").to_string());
        }
        match image::image_dimensions(p) {
            Ok((w, h)) => {
                let rel = p.strip_prefix(root).unwrap_or(p);
                let rel = if rel.as_os_str().is_empty() {
                    Path::new(p.file_name().unwrap_or(p.as_os_str()))
                } else {
                    rel
                };
                let key = rel.to_string_lossy().replace('\\', "/");
                items.push(LayoutItem::new(key.clone(), w, h));
                images.insert(key, p.clone());
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(Input {
        items,
        images: Some(images),
    })
}

// ---------- output ----------

/// Copies every placed source image to its frame. Advances `bar` once per placement.
fn compose_sheet(
    layout: &Layout,
    images: &HashMap<String, PathBuf>,
    bar: Option<&indicatif::ProgressBar>,
) -> RgbaImage {
    let mut sheet = RgbaImage::new(layout.width, layout.height);
    for p in &layout.placements {
        if let Some(b) = bar {
            b.inc(1);
        }
        let Some(path) = images.get(&p.key) else {
            continue;
        };
        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                image::imageops::replace(&mut sheet, &rgba, p.frame.x as i64, p.frame.y as i64);
            }
            Err(e) => error!(?path, error = %e, "skip image"),
        }
    }
    sheet
}

/// Largest PNG the CLI will allocate (16384 x 16384 RGBA, 1 GiB).
const MAX_PNG_PIXELS: u64 = 16_384 * 16_384;

fn ensure_png_size(layout: &Layout) -> anyhow::Result<()> {
    let pixels = layout.width as u64 * layout.height as u64;
    anyhow::ensure!(
        pixels <= MAX_PNG_PIXELS,
        "layout {}x{} is too large for a PNG ({} pixels, at most {}); use --layout-only",
        layout.width,
        layout.height,
        pixels,
        MAX_PNG_PIXELS
    );
    Ok(())
}

/// Draws each placement as a colored box with a darker outline.
fn render_preview(layout: &Layout) -> RgbaImage {
    let mut img = RgbaImage::new(layout.width, layout.height);
    for (i, p) in layout.placements.iter().enumerate() {
        let fill = color_for(i);
        let edge = Rgba([fill[0] / 2, fill[1] / 2, fill[2] / 2, 255]);
        let r = p.frame;
        for y in r.y..r.y + r.h {
            for x in r.x..r.x + r.w {
                let on_edge = x == r.x || y == r.y || x + 1 == r.x + r.w || y + 1 == r.y + r.h;
                img.put_pixel(x, y, if on_edge { edge } else { fill });
            }
        }
    }
    img
}

// Golden-angle hue walk so neighbouring blocks get distinct colors.
fn color_for(i: usize) -> Rgba<u8> {
    let hue = (i as f64 * 137.508) % 360.0;
    let (s, v) = (0.55, 0.95);
    let c = v * s;
    let hp = hue / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    let to_u8 = |f: f64| ((f + m) * 255.0).round() as u8;
    Rgba([to_u8(r), to_u8(g), to_u8(b), 255])
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

// ---------- YAML config ----------

#[derive(Deserialize, Debug, Default)]
struct YamlConfig {
    mode: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    sort_order: Option<String>,
    auto: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.mode {
            cfg.mode = v.parse::<PackMode>()?;
        }
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = v.parse::<SortOrder>()?;
        }
        if let Some(v) = self.auto {
            cfg.auto = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
