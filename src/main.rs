use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::{io, time::Duration};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ssh_selector::app::{App, Outcome};
use ssh_selector::cli::{Cli, LaunchMode, Settings};
use ssh_selector::config::ConfigManager;
use ssh_selector::models::HostRecord;
use ssh_selector::ssh_config::HostLoader;
use ssh_selector::ssh_service::SessionLauncher;
use ssh_selector::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new()?;
    let app_config = config_manager.load_config()?;
    let settings = Settings::new(cli, app_config);

    init_logging(&settings.app_log_path())?;
    debug!("Settings loaded from {:?}: {:?}", config_manager.get_config_path(), settings);
    if !config_manager.get_config_path().exists() {
        warn!(
            "Settings file {:?} could not be written, using defaults",
            config_manager.get_config_path()
        );
    }
    if settings.mode == LaunchMode::Native && settings.panel_id.is_some() {
        warn!("--panel-id has no effect without --zzh");
    }

    let hosts = HostLoader::from_env(settings.ssh_config_path.clone())
        .and_then(|loader| loader.load_hosts())
        .map_err(|e| {
            error!("Error loading SSH hosts: {}", e);
            e
        })
        .context("Error loading SSH hosts")?;

    match run_picker(hosts, &settings)? {
        Outcome::Quit => {
            info!("Quit without selecting a host");
            Ok(())
        }
        Outcome::Failed(message) => Err(anyhow!(message)),
        Outcome::Connect(host) => {
            SessionLauncher::new(&settings)
                .launch(&host)
                .await
                .map_err(|e| {
                    error!("Session to {} failed: {}", host.name, e);
                    e
                })?;
            info!("Session to {} completed", host.name);
            println!("SSH session completed.");
            Ok(())
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ssh_selector=info"));

    fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Owns the terminal while the list is shown and restores it afterwards,
/// so the session child gets a normal cooked-mode terminal.
fn run_picker(hosts: Vec<HostRecord>, settings: &Settings) -> Result<Outcome> {
    let mut app = App::new(hosts, settings.program());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(app.outcome())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.on_resize(size.width, size.height);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // The last frame stays visible while the session starts.
        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Resize(width, height) => app.on_resize(width, height),
                _ => {}
            }
        }
    }
}
