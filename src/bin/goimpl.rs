use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use goimpl::cli::{Cli, Commands};
use goimpl::{Config, Generator, GoLocator, ImplError};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // GOIMPL_LOG takes EnvFilter directives, e.g. `goimpl=debug`
    if let Ok(filter) = EnvFilter::try_from_env("GOIMPL_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(io::stderr)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Impl {
            receiver,
            iface,
            env,
        } => {
            let config = env.apply(Config::from_env());
            match run(&Generator::new(GoLocator::new(config)), &receiver, &iface) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("error on impl: {}", err.chain());
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run(generator: &Generator<GoLocator>, receiver: &str, iface: &str) -> Result<(), ImplError> {
    let mut out = io::stdout().lock();
    generator.impl_stubs(receiver, iface, &mut out)?;
    out.flush()?;
    Ok(())
}
