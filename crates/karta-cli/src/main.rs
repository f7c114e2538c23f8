//! Karta CLI - command-line interface for knowledge-artifact transformation
//!
//! This is the main entry point for the Karta CLI application, providing
//! commands for detecting, lifting, lowering, translating and validating
//! knowledge artifacts with the reference operators.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    let code = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => {
            let use_color = cli.use_color() && config.output.color;
            control::set_override(use_color);

            // Kept alive until exit so buffered file logs are flushed
            let _guard = match init_logging(&cli, &config) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("Failed to initialize logging: {}", e);
                    None
                }
            };

            report(run(cli, config, use_color))
        }
        Err(e) => report(Err(e)),
    };

    process::exit(code);
}

/// Print an error, if any, and pick the exit code
fn report(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            e.exit_code()
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = match cli.output {
        Some(format) => format,
        None => config.output_format()?,
    };
    let mut output = OutputWriter::new(format, use_color, cli.quiet, config.output.progress);

    let kernel = karta_languages::default_kernel();

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        operators = kernel.registry().len(),
        "Executing command"
    );

    match cli.command {
        Commands::Detect(args) => handlers::handle_detect(args, &kernel, &mut output),
        Commands::Lift(args) => handlers::handle_lift(args, &kernel, &config, &mut output),
        Commands::Lower(args) => handlers::handle_lower(args, &kernel, &config, &mut output),
        Commands::Translate(args) => handlers::handle_translate(args, &kernel, &config, &mut output),
        Commands::Validate(args) => handlers::handle_validate(args, &kernel, &config, &mut output),
        Commands::Operators(args) => handlers::handle_operators(args, &kernel, &mut output),
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<WorkerGuard>> {
    // Verbosity first, then the configuration file, then the environment
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.apply_settings(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
