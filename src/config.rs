//! Simulator settings read from TOML.
//!
//! ```toml
//! [memory]
//! capacity = 1024
//! strategy = "best-fit"
//! ```

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{AddressSpace, Error, Result, SearchMode};

pub const DEFAULT_CONFIG_FILENAME: &str = "fitsim.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub memory: MemoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
  pub capacity: usize,
  pub strategy: SearchMode,
}

impl Default for MemoryConfig {
  fn default() -> Self {
    Self {
      capacity: 1024,
      strategy: SearchMode::FirstFit,
    }
  }
}

impl Config {
  pub fn from_toml_str(text: &str) -> Result<Self> {
    let config: Self = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    log::debug!("loading config from {:?}", path);
    Self::from_toml_str(&text)
  }

  pub fn validate(&self) -> Result<()> {
    if self.memory.capacity == 0 {
      return Err(Error::InvalidArgument(
        "memory.capacity must be at least one cell".to_owned(),
      ));
    }
    Ok(())
  }

  /// Builds an empty address space with these settings.
  pub fn build(&self) -> Result<AddressSpace> {
    AddressSpace::with_mode(self.memory.capacity, self.memory.strategy)
  }
}
