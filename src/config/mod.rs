#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::codec::Protocol;
use crate::core::ConfigProvider;
use crate::domain::model::FixtureMap;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::Path;
use toml_config::TomlConfig;

/// Resolved fixture settings handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureConfig {
    pub entries: FixtureMap,
    pub protocol: Protocol,
    pub output_path: Option<String>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            entries: FixtureMap::sample(),
            protocol: Protocol::DEFAULT,
            output_path: None,
        }
    }
}

impl FixtureConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml(TomlConfig::from_file(path)?)
    }

    pub fn from_toml(config: TomlConfig) -> Result<Self> {
        let section = config.fixture;
        let protocol = match section.protocol {
            Some(version) => validation::validate_protocol("fixture.protocol", version)?,
            None => Protocol::DEFAULT,
        };
        let entries = section
            .entries
            .map(FixtureMap::from)
            .unwrap_or_else(FixtureMap::sample);

        Ok(Self {
            entries,
            protocol,
            output_path: section.output_path,
        })
    }
}

impl Validate for FixtureConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.output_path {
            validation::validate_path("output_path", path)?;
        }
        Ok(())
    }
}

impl ConfigProvider for FixtureConfig {
    fn entries(&self) -> &FixtureMap {
        &self.entries
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_sample_fixture() {
        let config = FixtureConfig::default();
        assert_eq!(config.entries(), &FixtureMap::sample());
        assert_eq!(config.protocol().version(), 4);
        assert!(config.output_path().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_rejects_bad_protocol() {
        let toml = TomlConfig::from_toml_str("[fixture]\nprotocol = 1\n").unwrap();
        assert!(FixtureConfig::from_toml(toml).is_err());
    }

    #[test]
    fn test_empty_key_is_accepted() {
        let toml = TomlConfig::from_toml_str("[fixture.entries]\n\"\" = \"x\"\n").unwrap();
        let config = FixtureConfig::from_toml(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.entries.get(""), Some("x"));
    }

    #[test]
    fn test_from_toml_empty_entries_table() {
        let toml = TomlConfig::from_toml_str("[fixture.entries]\n").unwrap();
        let config = FixtureConfig::from_toml(toml).unwrap();
        assert!(config.entries.is_empty());
    }
}
