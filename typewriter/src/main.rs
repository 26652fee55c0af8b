use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use typewriter::{open_desk, parse_line, render_sheet, Command, ConsoleSink, Desk, DeskConfig, Line};
use typewriter_core::{Event, InkColor, InputEvent, Key, KeyResult, Outcome};

#[derive(Parser)]
#[command(name = "typewriter")]
#[command(about = "Write letters on a virtual typewriter")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Theme to start with
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Ink colour to start with
    #[arg(long, global = true)]
    ink: Option<InkColor>,

    /// Where letters are stored
    #[arg(long, value_enum, global = true)]
    store: Option<typewriter::StoreBackend>,

    /// Letter database for the redb store
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory exported PDFs are written to
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive typing session (default)
    Repl,
    /// List saved letters, newest first
    Letters {
        /// Print full letter text, not just headlines
        #[arg(short, long)]
        full: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<DeskConfig> {
    let mut config = match &cli.config {
        Some(path) => DeskConfig::load_toml(path)?,
        None => DeskConfig::default(),
    };
    config.storage.apply_env();

    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if let Some(ink) = cli.ink {
        config.ink = ink;
    }
    if let Some(backend) = cli.store {
        config.storage.backend = backend;
    }
    if let Some(db) = &cli.db {
        config.storage.path = db.clone();
    }
    if let Some(dir) = &cli.export_dir {
        config.export_dir = dir.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => run_repl(config),
        Commands::Letters { full } => list_letters(config, full),
    }
}

fn list_letters(config: DeskConfig, full: bool) -> anyhow::Result<()> {
    let store = config.storage.open()?;
    let letters = store
        .try_get_letters()
        .context("fetching letters")?;
    if letters.is_empty() {
        println!("(no letters yet)");
    }
    for letter in letters {
        println!(
            "{}  [{}]  {}",
            letter.created_at.format("%Y-%m-%d %H:%M"),
            letter.theme,
            letter.headline()
        );
        if full {
            for line in &letter.content {
                println!("    {line}");
            }
            println!();
        }
    }
    Ok(())
}

fn run_repl(config: DeskConfig) -> anyhow::Result<()> {
    let width = config.base.max_chars_per_line;
    let sink = ConsoleSink::new(io::stdout());
    let mut desk = open_desk(config, sink)?;

    println!("typewriter - {} characters per line, :help for commands", width);
    show(&desk, width);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let raw = line.context("reading stdin")?;
        desk.tick(Instant::now());

        let parsed = match parse_line(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                println!("  {e:#}");
                continue;
            }
        };

        match parsed {
            Line::Type(text) => {
                let now = Instant::now();
                for ch in text.chars() {
                    desk.handle_input(&InputEvent::char(ch), now);
                }
                desk.handle_input(&InputEvent::key(Key::Enter), now);
                show(&desk, width);
            }
            Line::Command(Command::Quit) => break,
            Line::Command(command) => run_command(&mut desk, command, width),
        }
        io::stdout().flush()?;
    }

    desk.join_pending();
    Ok(())
}

fn run_command<W: Write>(desk: &mut Desk<ConsoleSink<W>>, command: Command, width: usize) {
    let now = Instant::now();
    match command {
        Command::Backspace(n) => {
            for _ in 0..n {
                desk.handle_input(&InputEvent::key(Key::Backspace), now);
            }
            show(desk, width);
        }
        Command::Enter => {
            desk.apply(Event::CarriageReturn, now);
            show(desk, width);
        }
        Command::Drag(dx) => {
            if desk.handle_input(&InputEvent::DragEnd { dx }, now) == KeyResult::NotHandled {
                println!("  (not far enough)");
            }
            show(desk, width);
        }
        Command::Finish => {
            if desk.finish(now) == Outcome::Refused {
                println!("  already finished");
            }
            show(desk, width);
        }
        Command::Save => {
            desk.save_letter();
            desk.join_pending();
        }
        Command::Export => {
            desk.export();
            desk.join_pending();
        }
        Command::New => {
            if desk.write_new(now) == Outcome::Refused {
                println!("  finish the letter first");
            }
            show(desk, width);
        }
        Command::Snapshot => {
            let snapshot = desk.take_snapshot();
            println!("  snapshot {}", snapshot.id);
        }
        Command::Archive => {
            if desk.archive().is_empty() {
                println!("  (no snapshots)");
            }
            for snapshot in desk.archive().iter() {
                println!("  {}  {}", snapshot.id, snapshot.taken_at.format("%H:%M:%S"));
                for line in snapshot.preview(15).lines() {
                    println!("    {line}");
                }
            }
        }
        Command::Letters => {
            let letters = desk.letters();
            if letters.is_empty() {
                println!("  (no letters)");
            }
            for letter in letters {
                println!(
                    "  {}  [{}]  {}",
                    letter.created_at.format("%Y-%m-%d %H:%M"),
                    letter.theme,
                    letter.headline()
                );
            }
        }
        Command::Theme(name) => {
            if desk.set_theme(&name) {
                show(desk, width);
            } else {
                println!("  themes: {}", desk.theme_names().join(", "));
            }
        }
        Command::Ink(ink) => {
            desk.set_ink(ink);
            show(desk, width);
        }
        Command::Show => show(desk, width),
        Command::Help => println!("{}", typewriter::repl::HELP),
        Command::Quit => {}
    }
}

fn show<W: Write>(desk: &Desk<ConsoleSink<W>>, width: usize) {
    println!(
        "{}",
        render_sheet(&desk.context(), desk.theme(), desk.ink(), width)
    );
}
