//! `difflog config`

use crate::commands::ConfigOverrides;
use clap::Args;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

pub fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    let config = args.overrides.resolve()?;
    print!("{}", toml::to_string(&config)?);
    Ok(())
}
