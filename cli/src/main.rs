use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use kirinuki::{AudioCue, GameEvent, GameSession, SessionHooks, Settings};
use kirinuki_core::{grid_label, GridSize, PlayMode, ShapeStyle};
use kirinuki_image_pipeline::{decode_image, encode_png, fit_to_display, slice_grid};
use rand::Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod bot;

#[derive(Parser)]
#[command(name = "kirinuki", version, about = "Cut photos into jigsaw puzzles and play them")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SessionArgs {
    /// TOML settings file; flags below override its values.
    #[arg(long, global = true, env = "KIRINUKI_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    pieces: Option<u32>,
    #[arg(long, global = true, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long, global = true, value_enum)]
    shape: Option<ShapeArg>,
    #[arg(long, global = true)]
    seed: Option<String>,
    #[arg(long, global = true)]
    max_width: Option<u32>,
    #[arg(long, global = true)]
    mute: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Free,
    Slots,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Tabbed,
    Rectangular,
}

#[derive(Subcommand)]
enum Commands {
    /// Scramble a puzzle and write the board as PNG.
    Render {
        image: PathBuf,
        #[arg(long, default_value = "board.png")]
        out: PathBuf,
        /// Also write the piece outlines as SVG.
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Cut the image into plain grid tiles, one PNG per piece.
    Slice {
        image: PathBuf,
        #[arg(long, default_value = "pieces")]
        out_dir: PathBuf,
    },
    /// Let a bot solve the puzzle through pointer events.
    Play {
        image: PathBuf,
        /// Write the finished board here.
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        bot: bot::BotArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli.session)?;

    match cli.command {
        Commands::Render { image, out, svg } => {
            let source = read_image(&image)?;
            let mut session = GameSession::new(settings.clone());
            session.start(&source, settings.grid_size)?;
            let board = draw_session(&session);
            std::fs::write(&out, encode_png(&board)?)?;
            println!("wrote {}", out.display());
            if let (Some(path), Some(set)) = (svg, session.pieces()) {
                std::fs::write(&path, kirinuki::renderer::outlines_svg(set))?;
                println!("wrote {}", path.display());
            }
        }
        Commands::Slice { image, out_dir } => {
            let source = fit_to_display(read_image(&image)?, settings.max_display_width);
            let grid = GridSize::new(settings.grid_size)?;
            std::fs::create_dir_all(&out_dir)?;
            let pieces = slice_grid(&source, grid.cols, grid.rows)?;
            for piece in &pieces {
                let path = out_dir.join(format!("piece_{:02}.png", piece.id));
                std::fs::write(&path, encode_png(&piece.image)?)?;
            }
            println!(
                "{}: wrote {} tiles to {}",
                grid_label(&grid),
                pieces.len(),
                out_dir.display()
            );
        }
        Commands::Play { image, out, bot } => {
            let source = read_image(&image)?;
            let events = Rc::new(RefCell::new(Vec::new()));
            let hooks = SessionHooks {
                on_event: {
                    let events = events.clone();
                    Rc::new(move |event: GameEvent| {
                        if event == GameEvent::Solved {
                            println!("solved!");
                        }
                        events.borrow_mut().push(event);
                    })
                },
                on_cue: Rc::new(|cue: AudioCue| tracing::trace!(?cue, "audio cue")),
            };
            let mut session = GameSession::with_hooks(settings.clone(), hooks);
            let set = session.start(&source, settings.grid_size)?;
            println!("{}", grid_label(&set.grid));
            let report = bot::run_bot(&mut session, &bot.into_config());
            let events = events.borrow();
            let snaps = events
                .iter()
                .filter(|event| {
                    matches!(event, GameEvent::Snapped { .. } | GameEvent::Slotted { .. })
                })
                .count();
            println!(
                "moves: {} placements: {} evictions: {} solved: {}",
                report.moves,
                snaps,
                events
                    .iter()
                    .filter(|event| matches!(event, GameEvent::Evicted { .. }))
                    .count(),
                session.solved()
            );
            if let Some(out) = out {
                std::fs::write(&out, encode_png(&draw_session(&session))?)?;
                println!("wrote {}", out.display());
            }
        }
    }

    Ok(())
}

fn load_settings(args: &SessionArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(pieces) = args.pieces {
        settings.grid_size = pieces;
    }
    if let Some(mode) = args.mode {
        settings.mode = match mode {
            ModeArg::Free => PlayMode::Free,
            ModeArg::Slots => PlayMode::Slots,
        };
    }
    if let Some(shape) = args.shape {
        settings.shape = match shape {
            ShapeArg::Tabbed => ShapeStyle::Tabbed,
            ShapeArg::Rectangular => ShapeStyle::Rectangular,
        };
    }
    if let Some(max_width) = args.max_width {
        settings.max_display_width = max_width;
    }
    if args.mute {
        settings.muted = true;
    }
    settings.seed = match args.seed.as_deref() {
        Some(raw) => Some(parse_seed_arg(raw)?),
        None => settings.seed.or_else(|| Some(rand::rng().random())),
    };
    tracing::info!(seed = ?settings.seed, "settings loaded");
    Ok(settings.validated()?)
}

fn read_image(path: &Path) -> Result<image::RgbaImage, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    Ok(decode_image(&bytes)?)
}

fn draw_session(session: &GameSession) -> image::RgbaImage {
    let (width, height) = session.canvas_size().unwrap_or((1, 1));
    let mut board = image::RgbaImage::from_pixel(width, height, image::Rgba([245, 245, 240, 255]));
    session.render(&mut board);
    board
}

fn parse_seed_arg(raw: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    let value = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)?
    } else {
        trimmed.parse::<u32>()?
    };
    Ok(value)
}
