use std::fmt;

/// Occupancy figures for one address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
  pub capacity: usize,
  pub total_free: usize,
  pub total_used: usize,
  pub free_count: usize,
  pub used_count: usize,
  pub largest_free: usize,
}

impl MemoryStats {
  /// Share of free cells outside the largest free segment, in percent.
  ///
  /// Zero when all free cells are contiguous (or none are free).
  pub fn fragmentation(&self) -> usize {
    if self.total_free == 0 {
      return 0;
    }
    let scattered = (self.total_free - self.largest_free) as u128;
    (scattered * 100 / self.total_free as u128) as usize
  }
}

impl fmt::Display for MemoryStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "used: {:>6} / {:>6}\nalloc: {:>5} ~avg: {:>6}\nfree: {:>6} ~avg: {:>6}\nlargest free: {} (fragmentation {}%)",
      self.total_used,
      self.capacity,
      self.used_count,
      self.total_used / self.used_count.max(1),
      self.free_count,
      self.total_free / self.free_count.max(1),
      self.largest_free,
      self.fragmentation(),
    )
  }
}
