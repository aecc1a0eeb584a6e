pub mod cli;
pub mod toml_config;

pub use toml_config::{IngestConfig, PortalConfig, SourceOverride, SourcesConfig};

#[cfg(feature = "cli")]
use crate::core::report::ReportFormat;
#[cfg(feature = "cli")]
use crate::domain::model::InventoryPolicy;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_directory, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "store-portal")]
#[command(about = "Builds per-store sales and per-customer purchase reports from catalog files")]
pub struct CliConfig {
    #[arg(long, help = "Directory holding the five source files; prompts when omitted")]
    pub dir: Option<PathBuf>,

    #[arg(long, help = "TOML file describing source file names and delimiters")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,

    #[arg(long, help = "Also write both reports into this directory")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, help = "Overrides ingest.inventory_policy from the config file")]
    pub inventory_policy: Option<InventoryPolicy>,

    #[arg(long, help = "Abort the run on the first stage error")]
    pub strict: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// The file config (or the default layout) with command-line overrides applied.
    pub fn portal_config(&self) -> Result<PortalConfig> {
        let mut config = match &self.config {
            Some(path) => PortalConfig::from_file(path)?,
            None => PortalConfig::default(),
        };

        if self.strict {
            config = config.with_strict(true);
        }
        if let Some(policy) = self.inventory_policy {
            config = config.with_inventory_policy(policy);
        }

        Ok(config)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.dir {
            validate_directory("dir", dir)?;
        }
        if let Some(output) = &self.output {
            validate_path("output", &output.to_string_lossy())?;
        }
        Ok(())
    }
}
