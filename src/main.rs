use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use bugwatch::cli::handlers::{self, CommandContext};
use bugwatch::cli::{Cli, Commands};
use bugwatch::config::{RunConfig, Settings};
use bugwatch::error::BugwatchError;
use bugwatch::{http, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose, cli.log_file.clone());
    http::install_crypto_provider();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            let code = e
                .downcast_ref::<BugwatchError>()
                .map(BugwatchError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

/// Returns whether every bug was handled cleanly.
fn run(cli: Cli) -> Result<bool> {
    let settings = Settings::load(cli.config.as_deref())?;
    let config = RunConfig::new(
        settings,
        cli.api_key,
        cli.slack_hook,
        cli.team_members,
        cli.team_vacations,
    );
    let ctx = CommandContext::new(config, cli.dry_run);

    let clean = match cli.command {
        Commands::Pretriage { secure_random } => {
            handlers::handle_pretriage(&ctx, secure_random)?.is_clean()
        }
        Commands::Posttriage => handlers::handle_posttriage(&ctx)?.is_clean(),
        Commands::Doctext => handlers::handle_doctext(&ctx)?.is_clean(),
        Commands::Check => {
            handlers::handle_check(&ctx)?;
            true
        }
    };
    Ok(clean)
}
