//! Java-- compiler command-line driver
//!
//! Compiles one source file through every stage and prints the selected
//! artifact (Jasmin assembly by default).

use clap::Parser;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "jmmc")]
#[command(about = "Java-- compiler: source to OLLIR to Jasmin", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    compile: commands::compile::Args,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = commands::compile::resolve_config(&cli.compile)?;
    init_logger(config.debug);

    commands::compile::execute(&cli.compile, config)
}

/// `RUST_LOG` wins; otherwise `debug` when requested, `warn` by default.
fn init_logger(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
