use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bootanim", version)]
struct Cli {
    /// Engine config JSON; fields not given keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header and segments of an animation archive.
    Inspect(InspectArgs),
    /// Pack a directory holding `desc.txt` and segment folders into a stored archive.
    Pack(PackArgs),
    /// Play an archive into PNG frames on disk.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Animation archive.
    #[arg(long)]
    archive: PathBuf,
}

#[derive(Parser, Debug)]
struct PackArgs {
    /// Directory containing `desc.txt`.
    #[arg(long)]
    dir: PathBuf,

    /// Output archive path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Archive for the primary display.
    #[arg(long)]
    archive: PathBuf,

    /// Output directory; frames land in `<out>/<display>/NNNNN.png`.
    #[arg(long)]
    out: PathBuf,

    /// Archive for a simulated external display.
    #[arg(long)]
    external_archive: Option<PathBuf>,

    /// Display pixel format (rgba8888, rgbx8888, bgra8888, rgb888, rgb565).
    #[arg(long, default_value = "rgbx8888")]
    format: String,

    /// Display width; defaults to the animation's width.
    #[arg(long)]
    width: Option<u32>,

    /// Display height; defaults to the animation's height.
    #[arg(long)]
    height: Option<u32>,

    /// Stop after this many milliseconds. Required for animations with an endless segment.
    #[arg(long)]
    run_for_ms: Option<u64>,

    /// Write backlight levels to the configured sysfs nodes instead of only logging them.
    #[arg(long)]
    sysfs_backlight: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => bootanim::EngineConfig::from_path(path)?,
        None => bootanim::EngineConfig::default(),
    };
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args, &config),
        Command::Pack(args) => cmd_pack(args),
        Command::Play(args) => cmd_play(args, config),
    }
}

fn cmd_inspect(args: InspectArgs, config: &bootanim::EngineConfig) -> anyhow::Result<()> {
    let desc = bootanim::AnimationDescriptor::load(&args.archive, &config.defaults)
        .with_context(|| format!("load animation '{}'", args.archive.display()))?;

    let size = desc.size();
    println!("size {}x{} fps {}", size.width, size.height, desc.fps());
    for (i, seg) in desc.segments().iter().enumerate() {
        println!(
            "segment {i}: path={} count={} pause={} frames={}",
            seg.path_prefix,
            seg.repeat.count(),
            seg.pause_frames,
            seg.frames.len()
        );
    }
    Ok(())
}

fn cmd_pack(args: PackArgs) -> anyhow::Result<()> {
    if !args.dir.join(bootanim::SCRIPT_NAME).is_file() {
        anyhow::bail!("'{}' has no {}", args.dir.display(), bootanim::SCRIPT_NAME);
    }

    let mut writer = bootanim::StoredArchiveWriter::new();
    let walker = walkdir::WalkDir::new(&args.dir)
        .min_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("walk '{}'", args.dir.display()))?;
        let name = member_name(&args.dir, entry.path())?;
        if entry.file_type().is_dir() {
            writer.add_directory(&name)?;
        } else if entry.file_type().is_file() {
            let data = std::fs::read(entry.path())
                .with_context(|| format!("read '{}'", entry.path().display()))?;
            writer.add_file(&name, &data)?;
        }
    }

    let entries = writer.len();
    writer.write_to_path(&args.out)?;
    println!("packed {entries} entries into {}", args.out.display());
    Ok(())
}

/// Archive member name of `path` relative to `root`, with `/` separators.
fn member_name(root: &Path, path: &Path) -> anyhow::Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("'{}' is outside '{}'", path.display(), root.display()))?;
    let parts = rel
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .with_context(|| format!("non UTF-8 path '{}'", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

fn cmd_play(args: PlayArgs, mut config: bootanim::EngineConfig) -> anyhow::Result<()> {
    let format = bootanim::PixelFormat::parse(&args.format)
        .with_context(|| format!("unknown pixel format '{}'", args.format))?;

    config.primary_archive = args.archive.clone();
    if let Some(external) = &args.external_archive {
        config.external_archive = external.clone();
    }
    config.validate()?;

    // Size the simulated panels after the animation unless told otherwise.
    let canvas = bootanim::AnimationDescriptor::load(&config.primary_archive, &config.defaults)
        .map(|d| d.size())
        .unwrap_or_else(|_| config.defaults.size());
    let geometry = bootanim::BufferGeometry::packed(
        args.width.unwrap_or(canvas.width),
        args.height.unwrap_or(canvas.height),
    );
    let spec = bootanim::DisplaySpec::new(geometry, format.hal_code());
    let external = args.external_archive.as_ref().map(|_| spec);
    let display = bootanim::PngSequenceDisplay::new(&args.out, spec, external)?;

    let backlight: Box<dyn bootanim::Backlight + Send> = if args.sysfs_backlight {
        Box::new(bootanim::SysfsBacklight::new(config.backlight.clone()))
    } else {
        Box::new(bootanim::RecordingBacklight::new())
    };

    let engine = bootanim::BootAnimationEngine::new(config, display, backlight);
    let mut animation = bootanim::BootAnimation::new(engine);
    animation.start()?;
    let report = match args.run_for_ms {
        Some(ms) => {
            std::thread::sleep(Duration::from_millis(ms));
            animation.stop()?
        }
        None => animation.wait()?,
    };

    let report = report.context("animation was not running")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
