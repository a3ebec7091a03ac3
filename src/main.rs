//! FlutterLens - Main entry point.
//!
//! A terminal dashboard for Flutter documentation, packages and issues.
//!
//! Usage: flutterlens [OPTIONS]
//!
//! Options:
//!   --version, -v      Show version
//!   --health           Check API health and exit (exit code 1 if down)
//!   --sync             Run a full sync, print counts and exit
//!   --api-url <URL>    Use this API base URL
//!   --local            Use the local API (http://localhost:8000)
//!
//! Settings are read from ~/.flutterlensrc.

use std::env;
use std::io;
use std::panic;
use std::process::ExitCode;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::runtime::Runtime;

use flutterlens::api::ApiClient;
use flutterlens::app::App;
use flutterlens::config::Config;
use flutterlens::logging;
use flutterlens::service::DataService;
use flutterlens::store::Store;
use flutterlens::VERSION;

/// Maximum iterations for main loop (safety bound).
const MAX_MAIN_ITERATIONS: usize = 10_000_000;

/// Origin host that selects the local API.
const LOCAL_ORIGIN: &str = "localhost";

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    // Handle --version flag
    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("flutterlens v{}", VERSION);
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Could not read config, using defaults: {}", e);
        Config::default()
    });

    let api_url = args
        .iter()
        .position(|a| a == "--api-url")
        .and_then(|i| args.get(i + 1))
        .cloned();
    let origin = args.iter().any(|a| a == "--local").then_some(LOCAL_ORIGIN);
    let client = match api_url {
        Some(url) if !url.trim().is_empty() => ApiClient::new(url.trim(), config.timeout),
        _ => config.api_client(origin),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("flutterlens-runtime")
        .build()?;

    let service = DataService::new(client, Store::new(config.ttls));

    // Handle --health flag
    if args.iter().any(|a| a == "--health") {
        logging::init_stderr(&config.log_config);
        return Ok(run_health(&runtime, &service));
    }

    // Handle --sync flag
    if args.iter().any(|a| a == "--sync") {
        logging::init_stderr(&config.log_config);
        return Ok(run_sync(&runtime, &service));
    }

    if let Err(e) = logging::init(&config.log_config) {
        eprintln!("Logging disabled: {}", e);
    }

    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create application
    let mut app = App::new(service, runtime.handle().clone(), config.page_size);
    app.start();

    // Main event loop
    let mut iterations = 0;
    let result = loop {
        if !app.is_running() || iterations >= MAX_MAIN_ITERATIONS {
            break Ok(());
        }

        if let Err(e) = terminal.draw(|frame| app.render(frame)) {
            break Err(e);
        }

        if let Err(e) = app.update() {
            break Err(e);
        }

        iterations += 1;
    };

    // Restore terminal
    restore_terminal()?;
    result?;

    tracing::info!("FlutterLens exiting");
    // Don't wait for in-flight requests
    runtime.shutdown_background();
    Ok(ExitCode::SUCCESS)
}

/// Prints API health. Fails when the API is down.
fn run_health(runtime: &Runtime, service: &DataService) -> ExitCode {
    let base_url = service.client().base_url().to_string();
    match runtime.block_on(service.check_health()) {
        Ok(health) => {
            println!(
                "{}: {} (version {}, database {})",
                base_url,
                health.status,
                health.version.as_deref().unwrap_or("unknown"),
                match health.supabase_configured {
                    Some(true) => "configured",
                    Some(false) => "not configured",
                    None => "unknown",
                }
            );
            if health.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("{}: {}", base_url, e);
            ExitCode::FAILURE
        }
    }
}

/// Runs a full sync and prints what was loaded.
fn run_sync(runtime: &Runtime, service: &DataService) -> ExitCode {
    runtime.block_on(service.trigger_sync());
    let state = service.store().snapshot();

    println!("Synced from {}", service.client().base_url());
    println!(
        "  docs:     {} loaded, {} total",
        state.docs.len(),
        state.stats.total_docs
    );
    println!(
        "  packages: {} loaded, {} total",
        state.packages.len(),
        state.stats.total_packages
    );
    println!(
        "  issues:   {} loaded, {} total",
        state.issues.len(),
        state.stats.total_issues
    );

    match state.error {
        Some(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

/// Restores the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
