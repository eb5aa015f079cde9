use futures::prelude::*;
use speedpost_tg::tracing_err;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file was found, using the process environment only")
    }

    let logging_task = speedpost_tg::init_logging();

    speedpost_tg::init_metrics();

    let exit_code = AssertUnwindSafe(try_main())
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            error!("The bot has panicked, exiting...");
            ExitCode::FAILURE
        });

    logging_task.shutdown().await;

    exit_code
}

async fn try_main() -> ExitCode {
    let config = speedpost_tg::Config::load_or_panic();

    match speedpost_tg::run(config).await {
        Ok(()) => {
            info!("The bot has stopped, exiting...");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(err = tracing_err(&err), "The bot has stopped with an error");
            ExitCode::FAILURE
        }
    }
}
