use clap::Parser;
use loadtrack_cli::{CliArgs, LoadtrackCli};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let cli = match LoadtrackCli::from_args("loadtrack", &args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("loadtrack: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("loadtrack: {e}");
            ExitCode::FAILURE
        }
    }
}
