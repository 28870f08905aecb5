mod app;
mod banner;
mod cli;
mod config;
mod error;
mod input;
mod k8s;
mod model;
mod shell;
mod ui;

use anyhow::{Context, Result};
use app::{App, NavState, run_command};
use clap::Parser;
use cli::CliArgs;
use crossterm::event::{
    Event, EventStream, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use futures::StreamExt;
use k8s::{ClusterGateway, KubeGateway};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use shell::{KubeExec, LocalTerminal};
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("kshell: {error:#}");
            1
        }
    };
    // The stdin reader thread may still be blocked on a read; exiting here
    // skips waiting for it during runtime shutdown.
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let args = CliArgs::parse();
    let settings = config::load_settings(&args)?;
    init_tracing(&settings.log_filter, settings.log_file.as_deref())?;
    if let Some(source) = &settings.source {
        debug!(config = %source.display(), "loaded config file");
    }

    let gateway = KubeGateway::new(settings.kubeconfig.as_deref(), settings.context.clone()).await?;
    let namespaces = gateway.list_namespaces().await?;
    let mut app = App::new(
        gateway.context().to_string(),
        namespaces,
        settings.show_labels,
    );

    navigate(&mut app, &gateway).await?;

    let NavState::Done(selection) = app.state() else {
        debug!("selection cancelled");
        return Ok(0);
    };

    println!("Opening a shell into {selection}");
    let backend = KubeExec::new(gateway.client());
    let outcome = shell::attach(
        &backend,
        &LocalTerminal,
        &selection.namespace,
        &selection.pod,
        Some(&selection.container),
    )
    .await;
    info!(%outcome, "session finished");

    if outcome.is_success() {
        Ok(0)
    } else {
        eprintln!("kshell: {outcome}");
        Ok(1)
    }
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    // The terminal belongs to the UI and the shell, so logs only go to a file.
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }

    Ok(())
}

async fn navigate(app: &mut App, gateway: &KubeGateway) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, gateway).await;
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
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
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

async fn run_loop(terminal: &mut TuiTerminal, app: &mut App, gateway: &KubeGateway) -> Result<()> {
    let mut reader = EventStream::new();
    // crossterm sends no resize event on start-up.
    let size = terminal.size().context("failed to read terminal size")?;
    app.on_resize(size.height);

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        match reader.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                if let Some(action) = input::map_key(app.mode(), key) {
                    debug!("action={action:?}");
                    let command = app.apply_action(action);
                    run_command(app, gateway, command).await?;
                }
            }
            Some(Ok(Event::Resize(_, rows))) => app.on_resize(rows),
            Some(Ok(_)) => {}
            Some(Err(error)) => return Err(error).context("failed to read terminal event"),
            None => break,
        }
    }

    Ok(())
}
