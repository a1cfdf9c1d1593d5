//! Taskpoll CLI: wait for a long-running operation from a shell or CI job
//!
//! ## Usage
//!
//! ```bash
//! taskpoll wait --file status.txt --in-progress Running --completed Done
//! taskpoll wait --url http://localhost:8080/progress --refresh-url http://localhost:8080/refresh
//! taskpoll config --config taskpoll.yaml
//! ```

use clap::Parser;
use std::process::ExitCode;
use taskpoll_cli::{handlers, logging, Cli, CliResult, Commands, Verbosity};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_exit(&err),
    };
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    logging::init_logging(verbosity, cli.log_json);

    match run(cli.command, verbosity) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Exit code 2 is reserved for timeouts, so usage errors exit 1
fn usage_exit(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    if err.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(command: Commands, verbosity: Verbosity) -> CliResult<u8> {
    match command {
        Commands::Wait(args) => {
            let outcome = handlers::execute_wait(&args, verbosity)?;
            Ok(handlers::exit_status(outcome))
        }
        Commands::Config(args) => {
            print!("{}", handlers::execute_config(&args)?);
            Ok(0)
        }
    }
}
