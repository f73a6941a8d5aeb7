use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "inkframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the whole scene as a PNG sequence, stepping by the scene's
    /// advisory fps.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Elapsed scene time in milliseconds.
    #[arg(long)]
    elapsed: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    opts: SceneOpts,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for frame_NNNNN.png files.
    #[arg(long = "out-dir")]
    out_dir: PathBuf,

    #[command(flatten)]
    opts: SceneOpts,
}

#[derive(Parser, Debug)]
struct SceneOpts {
    /// Surface width in pixels.
    #[arg(long, default_value_t = 900)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Style mode.
    #[arg(long, value_enum, default_value_t = ModeChoice::Strict)]
    mode: ModeChoice,

    /// Freeze animated properties at their final value after the window
    /// instead of reverting.
    #[arg(long)]
    hold_after_end: bool,

    /// Accept raw generator output (markdown fences, surrounding prose),
    /// falling back to a placeholder scene when nothing parses.
    #[arg(long)]
    lenient: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Strict,
    Rich,
}

impl From<ModeChoice> for inkframe::StyleMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Strict => inkframe::StyleMode::Strict,
            ModeChoice::Rich => inkframe::StyleMode::Rich,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_scene(path: &Path, lenient: bool) -> anyhow::Result<inkframe::Scene> {
    let scene = if lenient {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        inkframe::parse_generator_payload(&raw)
    } else {
        let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
        let r = BufReader::new(f);
        serde_json::from_reader(r).with_context(|| "parse scene JSON")?
    };
    scene.validate()?;
    Ok(scene)
}

fn settings_for(opts: &SceneOpts) -> inkframe::RenderSettings {
    inkframe::RenderSettings {
        width: opts.width,
        height: opts.height,
        mode: opts.mode.into(),
        hold_after_end: opts.hold_after_end,
        ..inkframe::RenderSettings::default()
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path, args.opts.lenient)?;
    let settings = settings_for(&args.opts);
    let mut backend = inkframe::create_backend()?;

    let elapsed = args.elapsed.clamp(0.0, scene.duration);
    let frame = inkframe::render_frame(&scene, elapsed, &settings, backend.as_mut())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path, args.opts.lenient)?;
    let settings = settings_for(&args.opts);
    let mut backend = inkframe::create_backend()?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let fps = if scene.fps.is_finite() && scene.fps > 0.0 {
        scene.fps
    } else {
        30.0
    };
    let step = 1000.0 / fps;
    let frames = (scene.duration / step).ceil() as u64;

    let mut written = 0u64;
    for i in 0..=frames {
        let elapsed = (i as f64 * step).min(scene.duration);
        let frame = inkframe::render_frame(&scene, elapsed, &settings, backend.as_mut())?;
        let out = args.out_dir.join(format!("frame_{i:05}.png"));
        write_png(&out, &frame)?;
        written += 1;
        if elapsed >= scene.duration {
            break;
        }
    }

    eprintln!("wrote {} frames to {}", written, args.out_dir.display());
    Ok(())
}

fn write_png(path: &Path, frame: &inkframe::FrameRGBA) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
