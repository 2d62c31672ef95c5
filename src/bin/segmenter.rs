use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use segmenter::SegmentationService as _;

#[derive(Parser, Debug)]
#[command(name = "segmenter", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the display size of an image fitted inside a container.
    Fit(FitArgs),
    /// Run automatic segmentation through the service.
    Auto(AutoArgs),
    /// Print the segment under a display position.
    Hover(HoverArgs),
    /// Print the bounding box of a mask.
    Bbox(BboxArgs),
    /// Write the masked segment (or cropped cutout) of an image.
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Content width.
    #[arg(long)]
    width: f64,
    /// Content height.
    #[arg(long)]
    height: f64,
    /// Container width.
    #[arg(long)]
    max_width: f64,
    /// Container height.
    #[arg(long)]
    max_height: f64,
}

#[derive(Parser, Debug)]
struct AutoArgs {
    /// Input image.
    #[arg(long)]
    image: PathBuf,
    /// Directory receiving `composite.png`, `color_map.json` and `segment-<id>.png`.
    #[arg(long)]
    out_dir: PathBuf,
    /// Service API root (defaults to `SEGMENTER_API_URL` or localhost).
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long, default_value_t = 32)]
    points_per_side: u32,
    #[arg(long, default_value_t = 0.88)]
    pred_iou_thresh: f64,
    #[arg(long, default_value_t = 0.95)]
    stability_score_thresh: f64,
}

#[derive(Parser, Debug)]
struct HoverArgs {
    /// Base image.
    #[arg(long)]
    image: PathBuf,
    /// Composite mask PNG.
    #[arg(long)]
    composite: PathBuf,
    /// Color map JSON (`{"(r, g, b)": {"segment_id": .., "confidence": ..}}`).
    #[arg(long)]
    color_map: PathBuf,
    /// Display x.
    #[arg(long)]
    x: f64,
    /// Display y.
    #[arg(long)]
    y: f64,
    /// Container width (defaults to the image width).
    #[arg(long)]
    max_width: Option<f64>,
    /// Container height (defaults to the image height).
    #[arg(long)]
    max_height: Option<f64>,
}

#[derive(Parser, Debug)]
struct BboxArgs {
    /// Mask PNG.
    #[arg(long)]
    mask: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Base image.
    #[arg(long)]
    image: PathBuf,
    /// Mask PNG.
    #[arg(long)]
    mask: PathBuf,
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
    /// Crop to the mask's bounding box.
    #[arg(long, default_value_t = false)]
    crop: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Fit(args) => cmd_fit(args),
        Command::Auto(args) => cmd_auto(args),
        Command::Hover(args) => cmd_hover(args),
        Command::Bbox(args) => cmd_bbox(args),
        Command::Extract(args) => cmd_extract(args),
    }
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    let (w, h) =
        segmenter::fit_dimensions(args.width, args.height, args.max_width, args.max_height);
    println!("{w} {h}");
    Ok(())
}

fn cmd_auto(args: AutoArgs) -> anyhow::Result<()> {
    let mut opts = segmenter::ServiceOpts::from_env()?;
    if let Some(url) = args.api_url {
        opts.base_url = url;
    }
    let params = segmenter::AutoSegmentParams {
        points_per_side: args.points_per_side,
        pred_iou_thresh: args.pred_iou_thresh,
        stability_score_thresh: args.stability_score_thresh,
    };
    let image = read(&args.image)?;

    let client = segmenter::HttpSegmentationClient::new(&opts)?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let resp = rt.block_on(client.auto_segment(&image, &params))?;
    let seg = segmenter::Segmentation::decode(&resp)?;

    if let Some(composite) = &seg.composite {
        write(&args.out_dir.join("composite.png"), &composite.mask_png)?;
        let json = serde_json::to_vec_pretty(&composite.color_map.to_wire())
            .context("serialize color map")?;
        write(&args.out_dir.join("color_map.json"), &json)?;
    }
    for s in &seg.segments {
        write(
            &args.out_dir.join(format!("segment-{}.png", s.id)),
            &s.mask_png,
        )?;
    }
    println!("{} segments", seg.segments.len());
    Ok(())
}

fn cmd_hover(args: HoverArgs) -> anyhow::Result<()> {
    let base = segmenter::BaseImage::decode(read(&args.image)?)?;
    let composite = segmenter::decode_image(&read(&args.composite)?)?;
    let wire: BTreeMap<String, segmenter::SegmentInfo> =
        serde_json::from_slice(&read(&args.color_map)?).context("parse color map json")?;

    let size = base.size();
    let max_w = args.max_width.unwrap_or(f64::from(size.width));
    let max_h = args.max_height.unwrap_or(f64::from(size.height));

    let mut scene = segmenter::SceneManager::default();
    scene.init(base, max_w, max_h)?;
    let mut compositor = segmenter::MaskCompositor::new();
    compositor.set_composite(&mut scene, composite, segmenter::CompositeStyle::default());
    compositor.set_color_map(segmenter::ColorMap::from_wire(&wire)?);

    let pool = segmenter::SurfacePool::default();
    let sampler = segmenter::PixelSampler::new(&pool);
    match compositor.decode_hover(&scene, &sampler, args.x, args.y) {
        Some(hit) => println!(
            "segment {} confidence {} color {}",
            hit.segment_id,
            hit.confidence,
            segmenter::ColorKey(hit.color)
        ),
        None => println!("no segment"),
    }
    Ok(())
}

fn cmd_bbox(args: BboxArgs) -> anyhow::Result<()> {
    let mask = segmenter::decode_image(&read(&args.mask)?)?;
    let rect = segmenter::bounding_box(&mask)
        .ok_or_else(|| segmenter::SegmenterError::empty_mask(args.mask.display().to_string()))?;
    println!("{} {} {} {}", rect.x, rect.y, rect.width, rect.height);
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let base = segmenter::decode_image(&read(&args.image)?)?;
    let mask = segmenter::decode_image(&read(&args.mask)?)?;
    let pool = segmenter::SurfacePool::default();
    let out = segmenter::extract(&base, &mask, args.crop, &pool)?;
    write(&args.out, &out.png)?;
    Ok(())
}
