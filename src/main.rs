// src/main.rs

use gmlaunch::errors::EXIT_OK;
use gmlaunch::{cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(()) => EXIT_OK,
        Err(err) => {
            eprintln!("gmlaunch error: {err}");
            err.exit_code()
        }
    };
    // Exit here: the blocking stdin reader would otherwise hold the runtime open.
    std::process::exit(code);
}

async fn run_main() -> gmlaunch::errors::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
