mod app;
mod cli;
mod config;
mod error;
mod filter;
mod input;
mod k8s;
mod model;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::CliArgs;
use config::RuntimeConfig;
use crossterm::event::{
    EventStream, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use error::FatalStartupError;
use futures::StreamExt;
use input::InputEvent;
use k8s::KubeGateway;
use model::Catalog;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::sync::Mutex;
use tokio::time::{Duration, timeout};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _args = CliArgs::parse();
    let config = RuntimeConfig::load()?;
    init_tracing(&config)?;
    if let Some(source) = &config.source {
        info!("loaded runtime config from {}", source.display());
    }

    let gateway = KubeGateway::connect(config.kubeconfig.as_deref(), config.context.clone()).await?;
    let catalog = discover_catalog(&gateway, config.discovery_timeout).await?;

    let mut app = App::new(
        catalog,
        gateway.cluster().to_string(),
        gateway.context().to_string(),
    );
    run(&mut app).await
}

fn init_tracing(config: &RuntimeConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact();

    // The terminal belongs to the UI, so logs go to a file or nowhere.
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = builder.with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(io::sink).try_init();
        }
    }

    Ok(())
}

async fn discover_catalog(gateway: &KubeGateway, limit: Duration) -> Result<Catalog> {
    let catalog = timeout(limit, gateway.list_resources())
        .await
        .map_err(|_| FatalStartupError::DiscoveryTimedOut(limit))??;
    for warning in catalog.warnings() {
        warn!(
            group_version = %warning.group_version,
            reason = %warning.reason,
            "partial discovery"
        );
    }
    Ok(catalog)
}

async fn run(app: &mut App) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = init_terminal()?;
    let run_result = run_loop(&mut terminal, app).await;
    let restore_result = restore_terminal(&mut terminal, keyboard_enhanced);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<(TuiTerminal, bool)> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .context("failed to enter alternate screen with keyboard enhancement")?;
    } else {
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok((terminal, keyboard_enhanced))
}

fn restore_terminal(terminal: &mut TuiTerminal, keyboard_enhanced: bool) -> Result<()> {
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("failed to pop keyboard enhancement flags")?;
    }
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Processes one terminal event at a time: dispatch, then redraw. Ends on
/// quit or when the event stream closes.
async fn run_loop(terminal: &mut TuiTerminal, app: &mut App) -> Result<()> {
    let (width, height) = crossterm::terminal::size().context("failed to read terminal size")?;
    input::dispatch(app, InputEvent::Resize { width, height });

    let mut reader = EventStream::new();
    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        match reader.next().await {
            Some(Ok(event)) => input::dispatch(app, InputEvent::from(event)),
            Some(Err(error)) => {
                return Err(error).context("failed to read terminal event");
            }
            None => {
                debug!("terminal event stream closed");
                break;
            }
        }
    }

    Ok(())
}
