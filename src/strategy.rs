//! Selection policies.
//!
//! A strategy only picks which free segment serves a request. Splitting,
//! bookkeeping and coalescing are shared by every policy and live in
//! [`AddressSpace`](crate::AddressSpace).

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{Error, segment::Segment};

pub trait Strategy {
  /// Short kebab-case name, used in logs and on the command line.
  fn name(&self) -> &'static str;

  /// Index into `free` of the segment that should serve `size` cells, or
  /// `None` if no segment is large enough.
  ///
  /// `free` is sorted by address and `size` is positive.
  fn select(
    &self,
    free: &[Segment],
    size: usize,
  ) -> Option<usize>;
}

/// The first segment, in address order, large enough for the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FirstFit;

impl Strategy for FirstFit {
  fn name(&self) -> &'static str {
    "first-fit"
  }

  fn select(
    &self,
    free: &[Segment],
    size: usize,
  ) -> Option<usize> {
    free.iter().position(|s| s.len() >= size)
  }
}

/// The segment leaving the smallest remainder.
///
/// Ties go to the lowest address: a later candidate only wins with a
/// strictly smaller remainder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BestFit;

impl Strategy for BestFit {
  fn name(&self) -> &'static str {
    "best-fit"
  }

  fn select(
    &self,
    free: &[Segment],
    size: usize,
  ) -> Option<usize> {
    // `min_by_key` keeps the first of equal minima.
    free
      .iter()
      .enumerate()
      .filter(|(_, s)| s.len() >= size)
      .min_by_key(|(_, s)| s.len() - size)
      .map(|(index, _)| index)
  }
}

/// A strategy chosen at runtime, e.g. from a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
  #[default]
  FirstFit,
  BestFit,
}

impl Strategy for SearchMode {
  fn name(&self) -> &'static str {
    match self {
      Self::FirstFit => FirstFit.name(),
      Self::BestFit => BestFit.name(),
    }
  }

  fn select(
    &self,
    free: &[Segment],
    size: usize,
  ) -> Option<usize> {
    match self {
      Self::FirstFit => FirstFit.select(free, size),
      Self::BestFit => BestFit.select(free, size),
    }
  }
}

impl FromStr for SearchMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "first-fit" | "first" | "ff" => Ok(Self::FirstFit),
      "best-fit" | "best" | "bf" => Ok(Self::BestFit),
      other => Err(Error::InvalidArgument(format!(
        "unknown search mode `{other}` (expected `first-fit` or `best-fit`)"
      ))),
    }
  }
}

impl fmt::Display for SearchMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}
