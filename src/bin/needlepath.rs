use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use needlepath::{
    Canvas, CpuSurface, PlaybackSession, SimulatorOpts, StitchIndex, StitchPlan, TimerQueue,
};

#[derive(Parser, Debug)]
#[command(name = "needlepath", version)]
struct Cli {
    /// Log more (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print stitch counts, bounding box and command histogram.
    Info(InfoArgs),
    /// Render the design as sewn up to one stitch, as a PNG.
    Frame(FrameArgs),
    /// Play the plan on a virtual clock and write one PNG per tick.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input stitch plan JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input stitch plan JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Stitch to show (1-based, clamped to the plan).
    #[arg(long)]
    stitch: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Panel width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Panel height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input stitch plan JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `frame_NNNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Panel width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Panel height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Stitches per second (overrides `NEEDLEPATH_SPEED`).
    #[arg(long)]
    speed: Option<u32>,

    /// Pick the speed so the whole plan plays in this many seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Stop writing after this many frames.
    #[arg(long, default_value_t = 10_000)]
    max_frames: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_plan(path: &Path) -> anyhow::Result<StitchPlan> {
    let f = File::open(path).with_context(|| format!("open stitch plan '{}'", path.display()))?;
    let plan = StitchPlan::from_reader(BufReader::new(f))
        .with_context(|| format!("parse stitch plan '{}'", path.display()))?;
    Ok(plan)
}

fn create_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let plan = read_plan(&args.in_path)?;
    let opts = SimulatorOpts::from_env();
    let index = StitchIndex::build(&plan, &opts);

    println!("blocks:   {}", plan.blocks.len());
    println!("stitches: {}", index.num_stitches());
    println!("segments: {}", index.segments().len());
    match plan.bounding_box() {
        Some(r) => println!(
            "bbox:     [{:.2}, {:.2}, {:.2}, {:.2}]",
            r.x0, r.y0, r.x1, r.y1
        ),
        None => println!("bbox:     none"),
    }
    let speed = opts.initial_speed(index.num_stitches());
    println!(
        "playback: {:.1}s at {speed} stitches/sec",
        index.num_stitches() as f64 / f64::from(speed)
    );
    println!("commands:");
    for (command, count) in index.command_histogram() {
        println!("  {:<13} {count}", command.label());
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let plan = read_plan(&args.in_path)?;
    let opts = SimulatorOpts::from_env();
    let canvas = Canvas::new(args.width, args.height);

    let mut session = PlaybackSession::new(opts, canvas, TimerQueue::new())?;
    session.load(&plan);
    session.stop();
    session.set_current_stitch(i64::try_from(args.stitch).unwrap_or(i64::MAX));

    let mut surface = CpuSurface::new(canvas, session.opts().background)?;
    session.render(&mut surface);
    let frame = surface.finish();

    if let Some(parent) = args.out.parent() {
        create_dir(parent)?;
    }
    frame.save_png(&args.out)?;

    let status = session.status();
    eprintln!(
        "wrote {} (stitch {}/{} {})",
        args.out.display(),
        status.stitch,
        status.num_stitches,
        status.command_label()
    );
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let plan = read_plan(&args.in_path)?;
    let mut opts = SimulatorOpts::from_env();
    if let Some(speed) = args.speed {
        opts.stitches_per_second = speed;
        opts.target_duration_secs = None;
    }
    if let Some(secs) = args.duration {
        opts.target_duration_secs = Some(secs);
    }
    let canvas = Canvas::new(args.width, args.height);

    let mut session = PlaybackSession::new(opts, canvas, TimerQueue::new())?;
    let mut surface = CpuSurface::new(canvas, session.opts().background)?;
    create_dir(&args.out_dir)?;

    session.load(&plan);
    let mut written = 0usize;
    let mut moved = true;
    while written < args.max_frames {
        if moved {
            for event in session.take_events() {
                tracing::debug!(?event, "playback event");
            }

            surface.begin_frame();
            session.render(&mut surface);
            let path = args.out_dir.join(format!("frame_{written:06}.png"));
            surface.finish().save_png(&path)?;
            written += 1;
        }

        let Some(ticket) = session.scheduler_mut().advance_to_next() else {
            break;
        };
        moved = session.on_tick(ticket);
    }

    let status = session.status();
    eprintln!(
        "wrote {written} frames to {} (stitch {}/{}, {:.2}s of playback)",
        args.out_dir.display(),
        status.stitch,
        status.num_stitches,
        session.scheduler().now().as_secs_f64()
    );
    Ok(())
}
