use vidres_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Log file when possible, stderr otherwise.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {err:#}");
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("vidres error: {:#}", err);
        std::process::exit(1);
    }
}
