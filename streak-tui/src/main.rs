use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event};

use streak::api::ApiClient;
use streak::app::App;
use streak::config::{ConfigManager, SERVER_URL_ENV};
use streak::logging::{self, LogConfig};
use streak::storage::FileStore;
use streak::{terminal, ui};

/// Streak - track daily habits and keep each other going
#[derive(Parser)]
#[command(name = "streak")]
#[command(about = "A terminal client for the Streak habit tracker")]
#[command(version)]
struct Cli {
    /// Backend base URL
    #[arg(long, short, env = "STREAK_API_BASE")]
    server: Option<String>,

    /// Directory holding the session, preferences and log file (default ~/.streak)
    #[arg(long, env = "STREAK_HOME")]
    data_dir: Option<PathBuf>,

    /// Remember the resolved server URL for later runs
    #[arg(long)]
    save_server: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap sees its values through `env = ...`
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(cli.data_dir)?;

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    }
    .in_dir(config_manager.config_dir());
    logging::init_logging(&log_config)?;

    let server_url = config_manager.determine_server_url(cli.server, std::env::var(SERVER_URL_ENV).ok())?;
    if cli.save_server {
        config_manager.save_server_url(server_url.clone())?;
    }
    log::info!("Using server {}", server_url);

    let store = Arc::new(FileStore::new(config_manager.config_dir()));
    let mut app = App::new(ApiClient::new(server_url), store, log_config);
    app.restore_session();

    let mut tui = terminal::init()?;
    let result = run(&mut tui, &mut app);
    terminal::restore()?;

    if let Err(e) = &result {
        log::error!("Exiting with error: {:#}", e);
    }
    result
}

fn run(tui: &mut terminal::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.drain_events();
        app.tick();

        tui.draw(|frame| ui::render(app, frame))?;

        if event::poll(Duration::from_millis(50))? {
            // Mouse and resize events only need the redraw above
            if let Event::Key(key) = event::read()? {
                app.handle_key_event(key)?;
            }
        }
    }
    Ok(())
}
