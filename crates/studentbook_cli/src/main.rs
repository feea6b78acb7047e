//! Studentbook command-line front end.
//!
//! # Responsibility
//! - Parse configuration and dispatch one command per invocation.
//! - Own all user-facing output, including error rendering.

mod args;
mod commands;
mod form;
mod view;

use anyhow::Context;
use args::Cli;
use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process::ExitCode;
use studentbook_core::{
    core_version, default_log_level, init_logging, JsonFileStore, StudentService,
    StudentValidationError,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = start_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err:#}");
        }
    }
    info!(
        "event=cli_start module=cli status=ok version={} data={}",
        core_version(),
        cli.data.display()
    );

    let service = StudentService::new(JsonFileStore::new(&cli.data));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match commands::execute(cli.command, &service, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err:#}");
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn start_logging(level: &str, log_dir: &Path) -> anyhow::Result<()> {
    let log_dir = std::path::absolute(log_dir)
        .with_context(|| format!("cannot resolve log directory `{}`", log_dir.display()))?;
    init_logging(level, &log_dir)?;
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    if let Some(validation) = err.downcast_ref::<StudentValidationError>() {
        eprintln!("error: validation failed");
        for message in validation.messages() {
            eprintln!("  - {message}");
        }
        return;
    }
    eprintln!("error: {err:#}");
}
