use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::sync::mpsc;
use std::time::Duration;
use tracing::info;

use vgdash::{ApiClient, App, AppConfig, AppEvent, Args, ConfigManager, APP_NAME};

/// Poll interval for terminal events; also paces the debounce tick.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let manager = ConfigManager::new(APP_NAME)?;
    if args.write_config {
        let path = manager.write_default_config(args.force)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = manager.load()?;
    apply_overrides(&mut config, &args);
    init_tracing(args.debug)?;

    let client = ApiClient::new(&config.api_url)?;

    if let Some(path) = &args.export {
        return run_export(client, &config, path);
    }

    let terminal = ratatui::init();
    let result = run(terminal, client, &config);
    ratatui::restore();
    result
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(per_page) = args.per_page {
        config.per_page = per_page;
    }
    if let Some(debounce_ms) = args.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
}

fn init_tracing(debug: bool) -> Result<()> {
    if !debug {
        return Ok(());
    }
    // Logging to stderr would fight the terminal UI, so append to a file.
    let log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(format!("{APP_NAME}.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{APP_NAME}=debug").into()),
        )
        .with_writer(std::sync::Mutex::new(log))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Headless export: fetch the dataset, write the full CSV view, exit.
fn run_export(client: ApiClient, config: &AppConfig, path: &std::path::Path) -> Result<()> {
    let (tx, _rx) = mpsc::channel();
    let mut app = App::new(tx, None, config);
    let records = client.fetch_records()?;
    app.load_store(records);
    std::fs::write(path, app.export_text())?;
    println!("Exported {} rows to {}", app.working_count, path.display());
    Ok(())
}

fn run(mut terminal: DefaultTerminal, client: ApiClient, config: &AppConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(tx.clone(), Some(client), config);
    info!("starting up");
    tx.send(AppEvent::Refresh)?;

    loop {
        terminal.draw(|frame| frame.render_widget(&mut app, frame.area()))?;

        // One queued event per frame so a loading frame is drawn between
        // an AppEvent::Refresh and its blocking AppEvent::DoFetch.
        if let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Exit => return Ok(()),
                AppEvent::Crash(message) => return Err(eyre!(message)),
                event => {
                    if let Some(follow_up) = app.event(&event) {
                        tx.send(follow_up)?;
                    }
                }
            }
            continue;
        }

        app.tick();

        if crossterm::event::poll(POLL_INTERVAL)? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(follow_up) = app.event(&AppEvent::Key(key)) {
                        tx.send(follow_up)?;
                    }
                }
                Event::Resize(width, height) => {
                    app.event(&AppEvent::Resize(width, height));
                }
                _ => {}
            }
        }
    }
}
