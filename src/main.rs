//! Flashgroup - study a deck in fixed-size sets
//!
//! Cards are shown one at a time; anything not yet mastered comes back at
//! the end of the set until every card in it has been mastered.

mod config;
mod error;
mod groups;
mod logging;
mod models;
mod session;
mod storage;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::{info, warn};

use config::Config;
use storage::CardStore;
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "flashgroup")]
#[command(author, version, about = "Study a flashcard deck in fixed-size sets", long_about = None)]
struct Args {
    /// Deck file (.csv with Front,Back,Extra columns, or .json)
    #[arg(short, long)]
    deck: Option<PathBuf>,

    /// Cards per set
    #[arg(short, long)]
    group_size: Option<usize>,

    /// Color theme (slate or paper)
    #[arg(short, long)]
    theme: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file to write to instead of the default location
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the sets in the deck and exit
    #[arg(long)]
    groups: bool,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_from(&config_path)?;

    // Command line wins over the config file
    if let Some(deck) = args.deck.clone() {
        config.deck = Some(deck);
    }
    if let Some(size) = args.group_size {
        config.group_size = size;
    }
    if let Some(ref theme) = args.theme {
        config.theme = theme.clone();
    }
    config.validate()?;

    let log_path = args.log_file.clone().unwrap_or_else(logging::default_log_path);
    if let Err(e) = logging::init(&log_path, &config.log_level) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let store = CardStore::load_or_bundled(config.deck.as_ref())?;
    info!(deck = store.title(), cards = store.len(), group_size = config.group_size, "deck ready");
    if store.is_empty() {
        warn!("deck has no usable cards");
    }

    if args.groups {
        print_groups(&store, config.group_size);
        return Ok(());
    }

    run_tui(App::new(store, config, Some(config_path)))
}

fn print_groups(store: &CardStore, group_size: usize) {
    println!("{} ({} cards)", store.title(), store.len());
    for group in 0..groups::group_count(store.len(), group_size) {
        if let Ok(range) = groups::group_range(store.len(), group_size, group) {
            let first = store.get(range.start).map(|c| c.front.as_str()).unwrap_or("");
            println!(
                "  Set {:>2}: cards {:>4}-{:<4} first: {}",
                group + 1,
                range.start + 1,
                range.end,
                first
            );
        }
    }
}

fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }
    info!("exiting");
    Ok(())
}
