//! RIG Load Tester - Main CLI Application

use clap::Parser;
use rig_load_tester::{
    cli::Cli,
    config::{load_config, EnvManager},
    error::{AppError, Result},
    App,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
    }));

    // Must run before clap reads the environment
    let env_file = EnvManager::load_env_file();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let error = AppError::from(e);
            eprintln!("{}", error.format_for_console(false));
            print_error_suggestions(&error);
            process::exit(error.exit_code());
        }
    };

    if cli.env_help {
        println!("{}", EnvManager::display_env_help());
        return;
    }

    let use_color = cli.use_colors();

    if let Err(e) = env_file {
        eprintln!("{}", e.format_for_console(use_color));
        process::exit(e.exit_code());
    }

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    let config = load_config(cli)?;
    App::new(config).run().await?;
    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - RIG_HOST, CLIENTS and TIMEOUT are required (or --host, --clients, --timeout)");
            eprintln!("  - TIMEOUT takes a duration such as 90s, 5m or 1m30s");
            eprintln!("  - Run with --env-help to list every supported variable");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("Startup help:");
            eprintln!("  - Another process may already be using the heartbeat port");
            eprintln!("  - Choose a different one with HEARTBEAT_PORT or --heartbeat-port");
        }
        _ => {}
    }
}
