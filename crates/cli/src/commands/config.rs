//! Effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use transcheck_common::HarnessConfig;

use crate::output::{print_success, OutputFormat};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Write the configuration here instead of printing it
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: ConfigArgs, config: &HarnessConfig, format: OutputFormat) -> Result<()> {
    if let Some(path) = args.output {
        config
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        print_success(&format!("Configuration written to {}", path.display()));
        return Ok(());
    }

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(config)?,
        OutputFormat::Yaml => serde_yaml::to_string(config)?,
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(config)?,
    };
    println!("{}", rendered);
    Ok(())
}
