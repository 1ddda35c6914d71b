//! Bento binary: parses the command line, installs logging and runs the command.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bento_lib::cli::Cli;

/// Builds the log filter: `RUST_LOG` wins, then `-v`, then `bento=info`.
fn log_filter(verbosity: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directive = match verbosity {
        0 => "bento=info,bento_lib=info",
        1 => "bento=debug,bento_lib=debug",
        _ => "bento=trace,bento_lib=trace",
    };

    EnvFilter::new(directive)
}

fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = bento_lib::cli::run(&cli) {
        eprintln!("bento: {err}");
        std::process::exit(1);
    }
}
