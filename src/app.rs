//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    geo::GeoLocator,
    log_debug, log_info, log_warn,
    logging::LoggerFactory,
    models::{Config, RunReport, SessionReport, UserInfo},
    output::{LiveDisplay, OutputCoordinator, OutputFormatterFactory},
    servers::{catalog, find_server},
    share::{ShareOutcome, Sharer},
    simulation::SpeedTest,
};
use futures::future;
use std::io::IsTerminal;
use std::path::Path;
use std::future::Future;
use tokio::task::{JoinError, JoinHandle};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        if self.cli.env_help {
            println!("{}", EnvManager::display_env_help());
            println!("Example .env file:\n");
            println!("{}", EnvManager::create_example_env_content());
            return Ok(());
        }

        let config = load_config(self.cli.clone())?;

        let warnings = validate_config(&config)?;
        if config.debug {
            eprintln!("{}", crate::build_info());
            eprintln!("\nConfiguration Summary:");
            eprintln!("{}\n", display_config_summary(&config));
            if let Some(problems) = EnvManager::check_env_file(Path::new(".env"))? {
                for problem in problems {
                    eprintln!("  .env: {}", problem);
                }
            }
        }
        if !warnings.is_empty() {
            eprintln!("Configuration Warnings:");
            for warning in &warnings {
                eprintln!("  {}", warning.format(config.enable_color));
            }
            eprintln!();
        }

        if self.cli.list_servers {
            let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
            println!("{}", formatter.format_server_list(&catalog(), config.server_id)?);
            return Ok(());
        }

        let factory = LoggerFactory::new(config.clone());
        let session = run_session(&config, &factory, !config.json_output).await?;

        if config.json_output {
            println!("{}", OutputCoordinator::display_json(&session)?);
        } else {
            let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_formatter(
                config.enable_color,
                config.verbose,
            ));
            println!("\n{}", coordinator.display_session(&session)?);
        }

        if config.share {
            share_results(&config, &factory, &session).await;
        }

        Ok(())
    }
}

/// Run every configured test and collect the session report.
///
/// The location lookup runs alongside the first test. Ctrl-C aborts the
/// test task mid-phase and returns a simulation error.
pub async fn run_session(config: &Config, factory: &LoggerFactory, live: bool) -> Result<SessionReport> {
    let logger = factory.create_logger("APP").await;
    let server = find_server(config.server_id)
        .ok_or_else(|| AppError::config(format!("Unknown server id {}", config.server_id)))?;

    if live {
        let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
        println!("{}", formatter.format_header(&format!("PingPanic v{}", crate::VERSION))?);
        println!("Server: {}\n", server);
    }

    let geo_task = spawn_geo_lookup(config, factory).await?;

    let test = SpeedTest::with_logger(config, factory.create_simulation_logger().await);
    let display_task = live.then(|| {
        let display = LiveDisplay::new(
            OutputFormatterFactory::create_formatter(config.enable_color, config.verbose),
            std::io::stdout(),
            std::io::stdout().is_terminal(),
        );
        tokio::spawn(display.follow(test.events(), test.subscribe(), config.runs))
    });

    log_info!(logger, "Starting {} run(s) against {}", config.runs, server);
    let test_task = test.spawn(config.runs);

    let Some(joined) = join_unless_interrupted(test_task, tokio::signal::ctrl_c()).await else {
        geo_task.abort();
        if let Some(task) = &display_task {
            task.abort();
        }
        log_warn!(logger, "Test cancelled by user");
        return Err(AppError::simulation("Test cancelled by user"));
    };
    let (test, outcomes) = joined?;

    // Closing the event stream lets the display finish even if it lagged
    let state = test.state();
    drop(test);

    if let Some(task) = display_task {
        task.await??;
    }

    let user_info = geo_task.await?;
    log_debug!(logger, "Location resolved to '{}'", user_info.location_label());

    let outcome = state
        .outcome
        .clone()
        .ok_or_else(|| AppError::simulation("Test finished without an outcome"))?;

    let report = RunReport {
        run: state.run,
        outcome,
        user_info,
        server,
        samples: state.samples,
    };
    Ok(SessionReport::new(outcomes, report))
}

/// Wait for `task` unless `interrupt` fires first, in which case the task
/// is aborted and `None` returned. An interrupt that fails to install is
/// ignored.
async fn join_unless_interrupted<T, F>(
    mut task: JoinHandle<T>,
    interrupt: F,
) -> Option<std::result::Result<T, JoinError>>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        joined = &mut task => Some(joined),
        Ok(()) = interrupt => {
            task.abort();
            None
        }
    }
}

async fn spawn_geo_lookup(config: &Config, factory: &LoggerFactory) -> Result<JoinHandle<UserInfo>> {
    if !config.geo_enabled {
        return Ok(tokio::spawn(future::ready(UserInfo::unavailable())));
    }

    let locator = GeoLocator::from_config(config)?;
    let geo_logger = factory.create_geo_logger().await;
    Ok(tokio::spawn(async move { locator.lookup(&geo_logger).await }))
}

/// Export the share text. Clipboard failure raises an alert; a failing
/// share command is only logged.
async fn share_results(config: &Config, factory: &LoggerFactory, session: &SessionReport) {
    let logger = factory.create_logger("SHARE").await;
    let error_logger = factory.create_error_logger().await;
    let reporter = ErrorReporter::new(config.enable_color, config.verbose);

    let text = session.report.outcome.share_text(config.share_url.as_deref());
    match Sharer::from_config(config).export(&text).await {
        ShareOutcome::Shared(target) => {
            log_info!(logger, "Results shared via {}", target);
            notify(config, &format!("Results shared via {}", target));
        }
        ShareOutcome::Copied(tool) => {
            log_info!(logger, "Results copied with {}", tool);
            notify(config, "Results copied to clipboard!");
        }
        ShareOutcome::ShareFailed(error) => {
            error_logger.log_error(&error, Some("share")).await;
        }
        ShareOutcome::CopyFailed(error) => {
            error_logger.log_error(&error, Some("clipboard")).await;
            reporter.alert("Failed to copy results.");
        }
    }
}

/// Status line that stays off stdout in JSON mode
fn notify(config: &Config, message: &str) {
    let formatter = OutputFormatterFactory::create_formatter(config.enable_color, false);
    let line = formatter
        .format_success(message)
        .unwrap_or_else(|_| message.to_string());
    if config.json_output {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}
