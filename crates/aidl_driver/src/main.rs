use std::io;
use std::process::{self, ExitCode};

use aidl_ast::Diagnostics;
use aidl_driver::cli::{Cli, Command};
use aidl_driver::report::{emit_plain, emit_pretty, record_unreported};
use aidl_driver::tasks::{self, DepFileOptions};
use aidl_parser::FsIoDelegate;
use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let io_delegate = FsIoDelegate;
    let mut diags = Diagnostics::new();

    let result = match &cli.command {
        Command::Check { inputs, depfile, ninja, output } => {
            let options = cli.global.load_options(inputs);
            let depfile = depfile.as_ref().map(|path| DepFileOptions {
                path: path.clone(),
                target: output.clone().unwrap_or_default(),
                ninja: *ninja,
            });
            tasks::check(inputs, &options, depfile.as_ref(), &io_delegate, &mut diags).map(|_| ())
        }
        Command::Preprocess { output, inputs } => {
            let options = cli.global.load_options(inputs);
            tasks::preprocess(inputs, output, &options, &io_delegate, &mut diags)
        }
        Command::DumpApi { output, inputs } => {
            let options = cli.global.load_options(inputs);
            tasks::dump_api(inputs, output, &options, &io_delegate, &mut diags)
        }
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "aidl", &mut io::stdout());
            return ExitCode::SUCCESS;
        }
    };

    if let Err(err) = &result {
        debug!(error = %err, "failed");
        record_unreported(err, &mut diags);
    }

    let rendered = if cli.global.pretty {
        emit_pretty(&diags, &io_delegate)
    } else {
        emit_plain(&diags, &mut io::stderr())
    };
    if let Err(err) = rendered {
        eprintln!("failed to write diagnostics: {}", err);
    }
    if diags.has_fatal() {
        process::abort();
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
