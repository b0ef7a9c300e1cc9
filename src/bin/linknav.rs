//! Linknav CLI Binary

use anyhow::Context;
use clap::Parser;
use linknav::config::ConfigLoader;
use linknav::logging::init_logging;
use linknav::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("validating configuration")?;
    init_logging(Some(&config.logging)).context("initializing logging")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let context = CliContext::from_config(config).context("opening data source and cache")?;
    let output = runtime.block_on(context.execute(&cli.command))?;
    print!("{}", output);
    Ok(())
}
