use std::{
  fmt,
  sync::atomic::{AtomicU64, Ordering},
};

/// Identifies one [`AddressSpace`](crate::AddressSpace) for the lifetime of
/// the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpaceId(u64);

impl SpaceId {
  pub(crate) fn next() -> Self {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    Self(NEXT.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Display for SpaceId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "space#{}", self.0)
  }
}

/// Refers to an allocated segment by owning space and start address.
///
/// Handles are only minted by [`AddressSpace::allocate`] and only mean
/// something to the space that minted them.
///
/// [`AddressSpace::allocate`]: crate::AddressSpace::allocate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
  space: SpaceId,
  address: usize,
}

impl Handle {
  pub(crate) fn new(
    space: SpaceId,
    address: usize,
  ) -> Self {
    Self { space, address }
  }

  pub fn space(&self) -> SpaceId {
    self.space
  }

  /// First cell of the allocation.
  pub fn address(&self) -> usize {
    self.address
  }
}

impl fmt::Display for Handle {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{} in {}", self.address, self.space)
  }
}
