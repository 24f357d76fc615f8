#![allow(clippy::too_many_lines)]

use std::process;

use clap::Parser;
use colored::Colorize;

use kmerator::cli::Args;
use kmerator::context::RunContext;
use kmerator::run;

/// Initialize the tracing subscriber with environment filter.
///
/// Set `RUST_LOG=kmerator=debug` to see worker-level detail. `--debug`
/// raises the default filter to `debug` for this run when `RUST_LOG` is
/// unset.
#[cfg(feature = "tracing")]
fn init_tracing(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "kmerator=debug" } else { "kmerator=info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let args = Args::parse();

    #[cfg(feature = "tracing")]
    init_tracing(args.debug);

    let ctx = RunContext::from_args(args).unwrap_or_else(|e| {
        eprintln!("{}\n {}", "Configuration error:".red().bold(), e.to_string().red());
        process::exit(1);
    });

    match run::run(&ctx) {
        Ok(report) => {
            eprintln!(
                "{}: {} done, {} failed",
                "run complete".bold(),
                report.done.len().to_string().green().bold(),
                report.failed.len().to_string().yellow().bold()
            );
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}\n {}", "Application error:".red().bold(), e.to_string().red());
            process::exit(1);
        }
    }
}
