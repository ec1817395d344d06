use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;

use ccentral_tui::app::{write_export, App, View};
use ccentral_tui::config::{Overrides, Settings};
use ccentral_tui::data::unix_now;
use ccentral_tui::refresh::{snapshot, Orchestrator};
use ccentral_tui::{events, logging, ui, Backend};

#[derive(Parser, Debug)]
#[command(name = "ccentral-tui")]
#[command(about = "Terminal dashboard for browsing and editing CCentral service configuration")]
struct Args {
    /// Base URL of the ccentral daemon
    #[arg(short, long, conflicts_with_all = ["file", "mock"])]
    url: Option<String>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve services from a JSON file instead of the daemon
    #[arg(short, long, conflicts_with = "mock")]
    file: Option<PathBuf>,

    /// Serve the built-in mock service
    #[arg(long)]
    mock: bool,

    /// Service to select on startup (required with --export)
    #[arg(short, long)]
    service: Option<String>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Export the service's view state to a JSON file and exit
    #[arg(short, long, requires = "service")]
    export: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.url.clone(),
            refresh_interval_secs: self.refresh,
            request_timeout_secs: self.timeout,
            log_file: self.log_file.clone(),
            data_file: self.file.clone(),
            mock: self.mock,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        logging::init_stderr()?;
        let service = args.service.as_deref().context("--export requires --service")?;
        return export_to_file(&settings, service, export_path);
    }

    logging::init_file(settings.log_file.as_deref())?;

    let rt = tokio::runtime::Runtime::new()?;
    let backend = settings.backend()?;
    info!(backend = backend.description(), "Starting dashboard");

    let orchestrator = Orchestrator::new(backend, rt.handle().clone());
    orchestrator.check_backend();
    orchestrator.load_services();

    let mut app = App::new(orchestrator);
    if let Some(ref service) = args.service {
        app.select_service(service);
    }

    // The runtime stays alive until the UI exits
    let result = run_tui(app, settings.refresh_interval());
    rt.shutdown_timeout(Duration::from_millis(500));
    result
}

/// Run the TUI until the user quits
fn run_tui(mut app: App, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        // Apply finished requests before drawing
        app.poll();

        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Services => ui::services::render(frame, app, chunks[2]),
                View::Config => ui::fields::render(frame, app, chunks[2]),
                View::Instances => ui::instances::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.editor.is_some() {
                ui::editor::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + block border (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }

        // Periodic refresh of the selected service
        if last_refresh.elapsed() >= refresh_interval {
            app.tick();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Fetch one service, build its view state and write it as JSON
fn export_to_file(settings: &Settings, service: &str, export_path: &Path) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let backend = settings.backend()?;

    let view = rt
        .block_on(snapshot(backend.as_ref(), service))
        .with_context(|| format!("Failed to fetch service {}", service))?;
    write_export(&view.export(unix_now()), export_path)?;

    println!("Exported {} to: {}", service, export_path.display());
    Ok(())
}
