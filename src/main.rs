use clap::Parser;
use eloquactl::cli::{self, Cli};
use eloquactl::logging::init_tracing;
use eloquactl::run_until_signal;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level, cli.log_format) {
        eprintln!("error: {}", e.report());
        return ExitCode::from(e.exit_code());
    }

    match run_until_signal(cli::run(cli)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {}", e.report());
            ExitCode::from(e.exit_code())
        }
    }
}
