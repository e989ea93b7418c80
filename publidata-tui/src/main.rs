//! Terminal UI for publidata that lists configured sources and shows their collection schedules.

mod app;
mod input;
mod ui;

use std::{fs, io, path::PathBuf, sync::Arc, time::Duration as StdDuration};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use publidata_core::{
    config::{AppConfig, SourceEntry},
    http::build_client,
    model::SourceKind,
    plugin::{PluginRegistry, SourcePlugin},
    service::PublidataService,
};
use publidata_provider_api as api;
use publidata_provider_widget as widget;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::input::Action;

#[derive(Debug, Parser)]
#[command(version, about = "Browse Publidata waste collection schedules")]
struct Args {
    /// TOML file listing the sources.
    #[arg(short, long, default_value = "publidata.toml")]
    config: PathBuf,

    /// Print every source's schedule to stdout and exit instead of opening the UI.
    #[arg(long)]
    plain: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let config = AppConfig::from_toml_str(&text)
        .with_context(|| format!("parsing {}", args.config.display()))?;

    // One HTTP client per source, each with its connector's timeout
    let plugins = config
        .sources
        .iter()
        .map(build_plugin)
        .collect::<Result<Vec<_>>>()?;
    info!("loaded {} sources from {}", plugins.len(), args.config.display());

    let registry = Arc::new(PluginRegistry::new(plugins));
    let service = Arc::new(PublidataService::new(registry));

    if args.plain {
        print_schedules(&service).await;
        return Ok(());
    }

    // App state
    let app = App::new(service);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn build_plugin(entry: &SourceEntry) -> Result<SourcePlugin> {
    let timeout = match entry.kind {
        SourceKind::Api => entry.source.timeout_or(api::DEFAULT_TIMEOUT),
        SourceKind::Widget => entry.source.timeout_or(widget::DEFAULT_TIMEOUT),
    };
    let client = build_client(timeout)?;

    let plugin = match entry.kind {
        SourceKind::Api => api::plugin(client, entry),
        SourceKind::Widget => widget::plugin(client, entry),
    };
    plugin.with_context(|| format!("source '{}'", entry.id))
}

#[expect(clippy::print_stdout, reason = "plain mode writes the schedules to stdout")]
async fn print_schedules(service: &PublidataService) {
    for source in service.sources() {
        println!("# {} ({})", source.name, source.kind);
        match service.fetch(&source.id).await {
            Ok(events) => {
                for event in events {
                    println!("{}\t{}", event.date.format("%Y-%m-%d"), event.waste_type);
                }
            }
            Err(err) => {
                error!("source '{}' failed: {err}", source.id);
                println!("schedule unavailable: {err}");
            }
        }
    }
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            let source = match action {
                Action::Quit => break,
                Action::None => continue,
                Action::OpenSchedule => {
                    let Some(source) = app.select_current_source() else {
                        app.error_message = Some("No sources configured".into());
                        continue;
                    };
                    source
                }
                Action::Refresh => {
                    let Some(source) = app.selected_source.clone() else {
                        app.error_message = Some("Select a source first".into());
                        continue;
                    };
                    source
                }
            };

            app.is_loading = true;
            app.error_message = None;
            terminal.draw(|frame| ui::draw(frame, &app))?;

            let res = app.service.fetch(&source.id).await;

            app.is_loading = false;
            match res {
                Ok(events) => {
                    app.events = events;
                }
                Err(err) => {
                    app.events.clear();
                    app.error_message = Some(format!("Schedule unavailable: {err}"));
                }
            }
        }
    }

    Ok(())
}
