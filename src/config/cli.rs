use super::FixtureConfig;
use crate::domain::model::FixtureMap;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pickle-fixture")]
#[command(version)]
#[command(about = "Print a base64-encoded pickle fixture for test suites")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Fixture entry as KEY=VALUE (repeatable). Replaces the default key=value entry
    #[arg(short, long = "entry", value_name = "KEY=VALUE", value_parser = parse_entry)]
    pub entries: Vec<(String, String)>,

    /// Path to a TOML fixture definition
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pickle protocol (2-5)
    #[arg(short, long)]
    pub protocol: Option<u8>,

    /// Write the fixture to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Decode a base64 pickle fixture and print it as JSON
    Decode {
        /// Base64 text; read from stdin when omitted
        input: Option<String>,
    },
}

fn parse_entry(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", raw))?;
    Ok((key.to_string(), value.to_string()))
}

impl CliConfig {
    /// Merges the optional TOML file with command line overrides.
    pub fn resolve(&self) -> Result<FixtureConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading fixture definition from: {}", path.display());
                FixtureConfig::from_file(path)?
            }
            None => FixtureConfig::default(),
        };

        if !self.entries.is_empty() {
            // 命令列提供的項目取代預設範例，但會合併到設定檔的項目上
            if self.config.is_none() {
                config.entries = FixtureMap::new();
            }
            config.entries.extend(self.entries.iter().cloned());
        }

        if let Some(version) = self.protocol {
            config.protocol = validation::validate_protocol("protocol", version)?;
        }

        if let Some(output) = &self.output {
            config.output_path = Some(output.clone());
        }

        config.validate()?;
        tracing::debug!("Resolved fixture config: {:?}", config);
        Ok(config)
    }
}
