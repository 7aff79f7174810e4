//! PingPanic - Main CLI Application
//!
//! Runs a simulated download, upload and ping test with a live gauge and
//! prints the result card.

use clap::Parser;
use pingpanic::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter, Result},
};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue with the command line you used.");
        process::exit(1);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        let error = AppError::validation(message);
        ErrorReporter::new(cli.use_colors(), cli.verbose).report_error(&error);
        process::exit(error.exit_code());
    }

    let use_color = cli.use_colors();
    let verbose = cli.verbose;

    if let Err(e) = run_application(cli).await {
        ErrorReporter::new(use_color, verbose).report_error(&e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    App::new(cli)?.run().await
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - Phase durations must be between 1 and 600000 ms");
            eprintln!("  - Tick interval must be between 1 and 10000 ms");
            eprintln!("  - Run with --list-servers to see valid server ids");
        }
        AppError::Share(_) => {
            eprintln!();
            eprintln!("Sharing help:");
            eprintln!("  - Install a clipboard tool (pbcopy, clip, wl-copy, xclip or xsel)");
            eprintln!("  - Or set SHARE_COMMAND to a program that reads stdin");
        }
        AppError::Simulation(_) => {
            eprintln!();
            eprintln!("The test was interrupted before it completed. Run it again to get results.");
        }
        _ => {}
    }
}
