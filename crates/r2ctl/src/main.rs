//! r2ctl - terminal console for R2 rollup rules.

mod logging;
mod worker;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use miette::{IntoDiagnostic, Result};
use r2ctl_api::R2Client;
use r2ctl_cli::Args;
use r2ctl_core::HistorySource;
use r2ctl_monitor::{App, FetchEvent, RuleHandlers, Theme};
use ratatui::prelude::*;
use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use worker::{ApiWorker, ChannelHandlers};

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(&args.log_file);

    let client = R2Client::new(&args.url).into_diagnostic()?;
    tracing::info!(
        "Starting r2ctl for namespace {} at {}",
        args.namespace,
        client.base_url()
    );

    // API requests run on a tokio runtime; the UI loop stays synchronous
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let (request_tx, request_rx) = tokio::sync::mpsc::unbounded_channel();
    let (event_tx, event_rx) = std::sync::mpsc::channel();
    let refresh = (args.refresh_interval > 0).then(|| Duration::from_secs(args.refresh_interval));
    let worker = ApiWorker::new(client, args.namespace.clone(), event_tx, refresh);
    runtime.spawn(worker.run(request_rx));

    let mut app = App::new(args.namespace.clone(), ChannelHandlers::new(request_tx))
        .with_theme(Theme::from_name(&args.theme));
    app.load_rules();
    if let Some(id) = args.rollup_rule_history {
        app.open_history(HistorySource::rollup_rule(&args.namespace, id));
    } else if let Some(id) = args.mapping_rule_history {
        app.open_history(HistorySource::mapping_rule(&args.namespace, id));
    }

    // Setup terminal
    enable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).into_diagnostic()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).into_diagnostic()?;

    // Run the main loop
    let res = run_app(&mut terminal, &mut app, &event_rx);

    // Restore terminal
    disable_raw_mode().into_diagnostic()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .into_diagnostic()?;
    terminal.show_cursor().into_diagnostic()?;

    // Dropping the app closes the request channel and stops the worker
    drop(app);
    runtime.shutdown_timeout(Duration::from_secs(1));

    // Handle result
    if let Err(err) = res {
        tracing::error!("UI loop failed: {}", err);
        eprintln!("Error: {}", err);
    }

    Ok(())
}

/// Main application loop.
fn run_app<H: RuleHandlers>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<H>,
    events: &Receiver<FetchEvent>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Apply finished requests
        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }

        // Draw UI
        terminal.draw(|frame| app.render(frame))?;

        // Handle events
        app.poll_events(tick_rate)?;

        // Check if we should quit
        if app.should_quit {
            return Ok(());
        }
    }
}
