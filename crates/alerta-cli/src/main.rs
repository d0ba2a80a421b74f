//! `elastalert-alerta` binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use alerta_alerter::LogTarget;
use alerta_cli::cli::{Cli, Commands};
use alerta_cli::commands::{CliEnv, ConfigCommand, InfoCommand, SendCommand};
use alerta_cli::{CliError, OutputFormat};
use alerta_config::ConfigResolver;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = CliEnv::new(cli.config.clone(), cli.profile.clone());
    if let Err(e) = alerta_alerter::logging::init(&LogTarget::detect(&env)) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli, env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, env: CliEnv) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();
    let resolver = ConfigResolver::new(env);

    match cli.command {
        Commands::Send(args) => SendCommand::new(resolver).execute(&mut stdout, &format, &args),
        Commands::Info => InfoCommand::execute(&mut stdout, &format),
        Commands::Config => ConfigCommand::new(resolver).execute(&mut stdout, &format),
    }
}
