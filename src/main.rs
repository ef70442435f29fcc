#![allow(clippy::enum_variant_names)]

use std::process::ExitCode;

use colored::Colorize as _;
use snafu::Report;
use tracing::debug;

use crate::{application::Application, cli::Cli};

mod application;
mod cli;
mod ext;
mod filesystem;
mod project;

fn main() -> ExitCode {
    let Some(cli_args) = Cli::parse_or_help() else {
        return ExitCode::FAILURE;
    };
    setup_tracing(&cli_args);
    setup_colors();
    debug!("Parsed CLI arguments: {cli_args:?}");

    match Application::run(cli_args) {
        Ok(summary) => {
            println!("{}", summary.to_string().green());
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", Report::from_error(err).to_string().red());
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing(cli_args: &Cli) {
    if let Some(level) = cli_args.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

fn setup_colors() {
    let stdout_has_colors = supports_color::on(supports_color::Stream::Stdout).is_some();
    colored::control::set_override(stdout_has_colors);
}
