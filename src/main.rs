use std::{io, process};

use koinonia::{
    application::{error::AppError, registry::ConfigRegistry},
    config::{self, Command},
    infra::telemetry,
};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

mod commands;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(error = %report.render(), source = report.source, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %report.render(), source = report.source, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let registry = ConfigRegistry::builtin();
    match cli_args.command {
        Command::Types => commands::run_types(registry),
        Command::Describe(args) => commands::run_describe(registry, &args),
        Command::CreatePath(args) => commands::run_create_path(registry, &args),
        Command::Submit(args) => commands::run_submit(&settings, registry, &args).await,
    }
}
