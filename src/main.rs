use clap::Parser;
use dotenv::dotenv;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gh_spyglass_lib::{run, Args};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let args = Args::parse();

    // Logs go to stderr so stdout only carries results.
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args).await {
        Ok(report) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = report.render(&mut stdout).and_then(|_| stdout.flush()) {
                eprintln!("error: failed to write output: {}", e);
                return ExitCode::FAILURE;
            }
            exit_code(report.exit_code())
        }
        Err(e) => {
            debug!("Run failed: {:?}", e);
            eprintln!("error: {}", e);
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
