//! clip-notes: plain-text notes with highlights and clipboard capture.
//!
//! # Usage
//!
//! ```bash
//! clip-notes new "Reading list"
//! clip-notes capture "Reading list"      # Ctrl+Shift+S or copy to append, Enter to stop
//! clip-notes highlight "Reading list" 0 12 "#FFD700"
//! clip-notes show "Reading list"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;

use clip_notes::capture::{CaptureSettings, CaptureWorker};
use clip_notes::config::{self, Config};
use clip_notes::document::{DocumentActor, DocumentCommand, DocumentEngine, DocumentMessage};
use clip_notes::highlights::AddOutcome;
use clip_notes::logging;

#[derive(Parser)]
#[command(name = "clip-notes")]
#[command(author, version, about = "Plain-text notes with highlights and clipboard capture")]
#[command(propagate_version = true)]
struct Cli {
    /// Notes directory (overrides notesDir from the config file)
    #[arg(long, global = true)]
    notes_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes
    List,

    /// Create an empty note
    New { name: String },

    /// Delete a note and its highlights
    Delete { name: String },

    /// Rename a note together with its highlights
    Rename { name: String, new_name: String },

    /// Print a note and the highlights that still match its text
    Show { name: String },

    /// Highlight characters [start, end) with a hex color
    Highlight {
        name: String,
        start: usize,
        end: usize,
        /// "#RGB" or "#RRGGBB"; see `palette`
        color: String,
    },

    /// Remove highlights overlapping characters [start, end)
    Clear {
        name: String,
        start: usize,
        end: usize,
    },

    /// Append a separator line
    Separator { name: String },

    /// Show the highlight palette
    Palette,

    /// Append clipboard captures to a note until Enter is pressed
    Capture { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logging_guard = logging::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = config::load_config();
    if let Some(dir) = cli.notes_dir {
        config.notes_dir = Some(dir);
    }

    match cli.command {
        Commands::List => cmd_list(&config),
        Commands::New { name } => {
            let mut engine = open_engine(&config)?;
            let handle = engine.create_note(&name)?;
            println!("Created {}", handle.path().display());
            Ok(())
        }
        Commands::Delete { name } => {
            let mut engine = open_engine(&config)?;
            engine.delete_note(&name)?;
            println!("Deleted {}", name);
            Ok(())
        }
        Commands::Rename { name, new_name } => {
            let mut engine = open_engine(&config)?;
            let renamed = engine.rename_note(&name, &new_name)?;
            println!("Renamed to {}", renamed.file_name());
            Ok(())
        }
        Commands::Show { name } => cmd_show(&config, &name),
        Commands::Highlight {
            name,
            start,
            end,
            color,
        } => {
            let mut engine = open_engine(&config)?;
            engine.open(&name)?;
            match engine.add_highlight(start, end, &color)? {
                AddOutcome::Added => println!("Highlighted {}..{} {}", start, end, color),
                AddOutcome::AlreadyPresent => println!("Already highlighted"),
            }
            Ok(())
        }
        Commands::Clear { name, start, end } => {
            let mut engine = open_engine(&config)?;
            engine.open(&name)?;
            let removed = engine.clear_highlights(start, end)?;
            println!("Removed {} highlight(s)", removed);
            Ok(())
        }
        Commands::Separator { name } => {
            let mut engine = open_engine(&config)?;
            engine.open(&name)?;
            engine.insert_separator(None, Instant::now())?;
            engine.save_now("separator")?;
            Ok(())
        }
        Commands::Palette => {
            for color in config.palette() {
                println!("{}", color);
            }
            Ok(())
        }
        Commands::Capture { name } => cmd_capture(&config, &name),
    }
}

fn open_engine(config: &Config) -> Result<DocumentEngine> {
    DocumentEngine::from_config(config)
        .with_context(|| format!("opening notes directory {}", config.notes_dir().display()))
}

fn cmd_list(config: &Config) -> Result<()> {
    let engine = open_engine(config)?;
    for note in engine.list_notes()? {
        println!("{}", note.file_name());
    }
    Ok(())
}

fn cmd_show(config: &Config, name: &str) -> Result<()> {
    let mut engine = open_engine(config)?;
    engine.open(name)?;
    let snapshot = engine.snapshot();

    println!("{}", snapshot.text);
    if !snapshot.spans.is_empty() {
        println!("---");
    }
    for span in &snapshot.spans {
        let covered: String = snapshot
            .text
            .chars()
            .skip(span.start)
            .take(span.end - span.start)
            .collect();
        println!(
            "{}..{} {} {:?}",
            span.start,
            span.end,
            span.color.as_deref().unwrap_or("-"),
            covered
        );
    }
    let hidden = snapshot.range_count.saturating_sub(snapshot.spans.len());
    if hidden > 0 {
        println!("({} highlight(s) no longer match the text)", hidden);
    }
    Ok(())
}

fn cmd_capture(config: &Config, name: &str) -> Result<()> {
    let settings = CaptureSettings::from_config(config).context("invalid captureHotkey")?;
    let engine = open_engine(config)?;
    let (actor, inbox) = DocumentActor::new(engine);
    let owner = actor.spawn().context("failed to start document thread")?;

    inbox
        .send(DocumentCommand::Open(name.to_string()).into())
        .context("document thread stopped")?;

    let mut worker = CaptureWorker::system(settings.clone(), inbox.clone());
    worker.start();
    println!(
        "Capturing into {}. Copy text or press {}. Press Enter to stop.",
        name,
        settings.chord.display()
    );

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading stdin")?;

    worker.stop();
    let _ = inbox.send(DocumentMessage::Shutdown);
    let engine = owner
        .join()
        .map_err(|_| anyhow::anyhow!("document thread panicked"))?;

    info!(note = name, "Capture session ended");
    if let Some(text) = engine.text() {
        println!("{} now has {} characters", name, text.chars().count());
    }
    for status in logging::recent_status() {
        println!("  {}", status);
    }
    Ok(())
}
