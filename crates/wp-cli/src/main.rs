use std::process::ExitCode;

use clap::Parser;
use wp_cli::{Cli, run};

// Single-threaded: the renderer is forked from the main thread, which its
// parent-death signal is tied to.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            if let Some(output) = output {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_benign() => {
            println!("{e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            eprintln!("Hint: {}", e.recovery_hint());
            ExitCode::FAILURE
        }
    }
}
