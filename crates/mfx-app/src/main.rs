use anyhow::Result;
use clap::Parser;
use mfx_app::cli::Cli;
use mfx_app::{pipeline, report};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.print_config {
        let params = pipeline::load_params(cli.config.as_deref())?;
        print!("{}", params.to_toml_string()?);
        return Ok(());
    }

    let report = pipeline::run(&cli)?;
    report::write_report(&report, cli.output.as_deref())?;
    Ok(())
}
