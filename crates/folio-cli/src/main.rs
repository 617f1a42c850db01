//! folio command-line tool.
//!
//! Renders document snapshots and replays recorded editing sessions
//! through the editor, printing the outgoing commands and the final views.
//!
//! Usage:
//!   # Outline of a snapshot (JSON array of events)
//!   folio render demos/groceries.events.json
//!
//!   # Replay a session; commands go to stdout as JSON lines
//!   folio replay demos/groceries.session.json
//!   folio --config editor.ron replay session.json --json

mod outline;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use folio_client::EditorConfig;
use folio_render::ViewItem;

use crate::session::{Session, replay};

/// Render folio documents and replay editing sessions.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Render folio documents and replay editing sessions")]
struct Args {
    /// Editor config file (RON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Render a snapshot given as a JSON array of events
    Render {
        path: PathBuf,

        /// Print view items as JSON instead of an outline
        #[arg(long)]
        json: bool,
    },
    /// Replay a recorded session
    Replay {
        path: PathBuf,

        /// Print final view items as JSON instead of an outline
        #[arg(long)]
        json: bool,
    },
}

fn print_views(views: &[ViewItem], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(views)?);
    } else {
        print!("{}", outline::outline(views));
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match args.command {
        Cmd::Render { path, json } => {
            let session = Session::load_events(&path)?;
            let result = replay(&session, config);
            print_views(&result.views, json)?;
        }
        Cmd::Replay { path, json } => {
            let session = Session::load(&path)?;
            let result = replay(&session, config);
            for command in &result.commands {
                println!("{}", serde_json::to_string(command)?);
            }
            println!();
            print_views(&result.views, json)?;
            info!(
                steps = session.steps.len(),
                commands = result.commands.len(),
                rejected = result.rejected.len(),
                "replay finished"
            );
            for (step, message) in &result.rejected {
                eprintln!("step {step}: {message}");
            }
        }
    }
    Ok(())
}
