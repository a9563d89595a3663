//! Errors reported by the simulator and its drivers.

use thiserror::Error;

use crate::handle::Handle;

#[derive(Error, Debug)]
pub enum Error {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),
  #[error("out of memory: no free segment holds {requested} cells (largest free segment: {largest_free})")]
  OutOfMemory { requested: usize, largest_free: usize },
  #[error("no allocation at {0}")]
  NotFound(Handle),
  #[error("not implemented: {0}")]
  NotImplemented(&'static str),
  #[error("io: {0}")]
  Io(#[from] std::io::Error),
  #[error("config: {0}")]
  Config(#[from] toml::de::Error),
  #[error("script line {line}: {message}")]
  Script { line: usize, message: String },
}

impl Error {
  /// Whether the caller may retry after releasing other allocations.
  pub fn is_recoverable(&self) -> bool {
    matches!(self, Self::OutOfMemory { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
