//! bankbranch - a terminal browser for Indian bank branch listings.
//!
//! The branch list is fetched once and kept in a local cache, so after the
//! first run the browser works offline. Branches can be filtered by city,
//! searched across every column, marked as favourites and paged through.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bankbranch_core::{ApiClient, CacheManager, Config, RecordStore};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "bankbranch.log";

const USAGE: &str = "\
Usage: bankbranch [OPTION]

Options:
  --refresh       Discard the cached branch list before starting
  --dump          Print the branch list as JSON and exit
  --clear-cache   Delete the cached branch list and exit
  -h, --help      Show this help";

/// Initialize the tracing subscriber for logging.
///
/// The terminal is in raw mode while the UI runs, so logs go to a daily
/// file in `log_dir`. The returned guard must live until shutdown.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {:#} - using default configuration", e);
            Config::default()
        }
    };
    let cache_dir = config.cache_dir()?;
    std::fs::create_dir_all(&cache_dir)?;
    let _guard = init_tracing(&cache_dir);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--dump") => return dump_branches(&config).await,
        Some("--clear-cache") => return clear_cache(&config),
        Some("--refresh") => {
            clear_cache(&config)?;
        }
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown option: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
        None => {}
    }

    info!("bankbranch starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start_load();

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("bankbranch shutting down");
    Ok(())
}

fn open_store(config: &Config) -> Result<RecordStore> {
    let cache = CacheManager::new(config.cache_dir()?)?;
    Ok(RecordStore::new(cache, config.cache_ttl()))
}

/// Load the branch list (cache first) and print it to stdout as JSON
async fn dump_branches(config: &Config) -> Result<()> {
    let api = ApiClient::new(&config.api_base_url)?;
    let mut store = open_store(config)?;

    eprintln!("Loading branch list...");
    let records = store.load(&api).await?;
    println!("{}", serde_json::to_string_pretty(records)?);

    eprintln!(
        "Done! {} branches ({} favourites), updated {}.",
        store.len(),
        store.favourite_count(),
        store.cache_age().unwrap_or_else(|| "never".to_string())
    );
    Ok(())
}

fn clear_cache(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    if store.clear_cache()? {
        info!("Cached branch list removed");
        eprintln!("Cached branch list removed.");
    } else {
        warn!("No cached branch list to remove");
        eprintln!("No cached branch list.");
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
