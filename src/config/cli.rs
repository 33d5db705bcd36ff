use crate::config::toml_config::{DispatchConfig, ImportConfig, LoggingConfig, StoreConfig};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "product-import")]
#[command(about = "Import products from a spreadsheet export and queue image processing")]
pub struct CliConfig {
    /// Spreadsheet to import (.csv or .json), relative to the base path
    pub locator: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override source.base_path
    #[arg(long)]
    pub base_path: Option<String>,

    /// Store products in this JSON file
    #[arg(long)]
    pub store_path: Option<String>,

    /// Append image requests to this JSON-lines outbox
    #[arg(long, conflicts_with = "dispatch_endpoint")]
    pub queue_path: Option<String>,

    /// POST image requests to this endpoint
    #[arg(long)]
    pub dispatch_endpoint: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_parser = ["compact", "json"])]
    pub log_format: Option<String>,

    /// Validate and report without creating products or queueing requests
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// Loads the configuration file (or defaults) and applies command-line overrides.
    pub fn resolve(&self) -> Result<ImportConfig> {
        let mut config = match &self.config {
            Some(path) => ImportConfig::from_file(path)?,
            None => ImportConfig::default(),
        };

        if let Some(base_path) = &self.base_path {
            config.source.base_path = base_path.clone();
        }
        if let Some(path) = &self.store_path {
            config.store = StoreConfig::JsonFile { path: path.clone() };
        }
        if let Some(path) = &self.queue_path {
            config.dispatch = DispatchConfig::JsonLines { path: path.clone() };
        }
        if let Some(endpoint) = &self.dispatch_endpoint {
            let timeout_seconds = match &config.dispatch {
                DispatchConfig::Http {
                    timeout_seconds, ..
                } => *timeout_seconds,
                _ => None,
            };
            config.dispatch = DispatchConfig::Http {
                endpoint: endpoint.clone(),
                timeout_seconds,
            };
        }
        if let Some(format) = &self.log_format {
            config
                .logging
                .get_or_insert_with(LoggingConfig::default)
                .format = Some(format.clone());
        }

        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("locator", &self.locator)?;
        if let Some(endpoint) = &self.dispatch_endpoint {
            validation::validate_url("dispatch_endpoint", endpoint)?;
        }
        Ok(())
    }
}
