use std::env;
use std::io;
use std::process;
use std::sync::Arc;

use savings_flow::csv::{read_script, write_report};
use savings_flow::script::ScriptRunner;
use savings_flow::{Config, Ledger};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .expect("usage: savings-flow <events.csv> [config.toml]");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let config = match args.next() {
        Some(config_path) => Config::load(&config_path).unwrap_or_else(|e| {
            error!("{e}");
            process::exit(1);
        }),
        None => Config::default(),
    };

    let steps = read_script(path.clone()).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });

    let mut runner = ScriptRunner::new(Arc::new(Ledger::with_demo_users()), config);
    let (step_sender, step_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in steps {
            match result {
                Ok(step) => {
                    if step_sender.send(step).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    runner.run(ReceiverStream::new(step_receiver)).await;

    let Some(report) = runner.report().await else {
        warn!("script never opened a session, nothing to report");
        return;
    };
    if let Err(e) = write_report(io::stdout().lock(), &report.view, report.account) {
        error!("failed to write report: {e}");
        process::exit(1);
    }
}
