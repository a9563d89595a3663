use std::fmt;

use log::{debug, warn};

use crate::{
  Error, Result,
  handle::{Handle, SpaceId},
  layout::Layout,
  segment::Segment,
  segment_list::SegmentList,
  stats::MemoryStats,
  strategy::{BestFit, FirstFit, SearchMode, Strategy},
};

pub type FirstFitSpace = AddressSpace<FirstFit>;
pub type BestFitSpace = AddressSpace<BestFit>;

/// A simulated linear memory of `capacity` cells.
///
/// Every cell belongs to exactly one segment of either the free list or the
/// allocated list. Both lists are sorted by address, and no two free segments
/// are ever adjacent once a call returns.
#[derive(Debug)]
pub struct AddressSpace<S = SearchMode> {
  id: SpaceId,
  capacity: usize,
  strategy: S,
  free: SegmentList,
  allocated: SegmentList,
}

/// A clone is a separate space with its own id, so handles never cross
/// between the copy and the original.
impl<S: Clone> Clone for AddressSpace<S> {
  fn clone(&self) -> Self {
    Self {
      id: SpaceId::next(),
      capacity: self.capacity,
      strategy: self.strategy.clone(),
      free: self.free.clone(),
      allocated: self.allocated.clone(),
    }
  }
}

impl<S: Strategy + Default> AddressSpace<S> {
  pub fn new(capacity: usize) -> Result<Self> {
    Self::with_strategy(capacity, S::default())
  }
}

impl AddressSpace<SearchMode> {
  pub fn with_mode(
    capacity: usize,
    mode: SearchMode,
  ) -> Result<Self> {
    Self::with_strategy(capacity, mode)
  }
}

impl<S: Strategy> AddressSpace<S> {
  pub fn with_strategy(
    capacity: usize,
    strategy: S,
  ) -> Result<Self> {
    if capacity == 0 {
      return Err(Error::InvalidArgument(
        "capacity must be at least one cell".to_owned(),
      ));
    }

    let space = Self {
      id: SpaceId::next(),
      capacity,
      strategy,
      free: SegmentList::single(Segment::new(0, capacity)),
      allocated: SegmentList::new(),
    };
    debug!(
      "created {} with {} cells ({})",
      space.id,
      capacity,
      space.strategy.name()
    );
    Ok(space)
  }

  /// Reserves `size` contiguous cells.
  ///
  /// Neither list is touched unless the allocation succeeds.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Handle> {
    if size == 0 {
      return Err(Error::InvalidArgument(
        "allocation size must be at least one cell".to_owned(),
      ));
    }

    let index = self
      .strategy
      .select(self.free.as_slice(), size)
      .ok_or_else(|| Error::OutOfMemory {
        requested: size,
        largest_free: self.free.largest().unwrap_or(0),
      })?;

    let segment = self.free.take(index, size);
    self.allocated.insert_sorted(segment);
    self.check();

    debug!(
      "{}: allocated {} cells at {} ({})",
      self.id,
      size,
      segment.start(),
      self.strategy.name()
    );
    Ok(Handle::new(self.id, segment.start()))
  }

  /// Returns the cells behind `handle` to the free list, merging them with
  /// free neighbours.
  ///
  /// A handle minted by another space is rejected with
  /// [`Error::InvalidArgument`]; one that names no live allocation of this
  /// space (never allocated, already released, or dropped by [`reset`]) with
  /// [`Error::NotFound`].
  ///
  /// [`reset`]: AddressSpace::reset
  pub fn release(
    &mut self,
    handle: Handle,
  ) -> Result<()> {
    if handle.space() != self.id {
      warn!("{}: rejected release of foreign handle {}", self.id, handle);
      return Err(Error::InvalidArgument(format!(
        "handle {} does not belong to {}",
        handle, self.id
      )));
    }

    let Some(index) = self.allocated.position_of(handle.address()) else {
      warn!("{}: nothing allocated at {}", self.id, handle.address());
      return Err(Error::NotFound(handle));
    };

    let segment = self.allocated.remove(index);
    self.free.insert_sorted(segment);
    let merged = self.free.coalesce_adjacent();
    self.check();

    debug!(
      "{}: released {} ({} merge(s), {} free segment(s))",
      self.id,
      segment,
      merged,
      self.free.len()
    );
    Ok(())
  }

  /// Moving allocations together to close the gaps between them is not
  /// supported; the space is left as it is.
  pub fn compact(&mut self) -> Result<()> {
    Err(Error::NotImplemented("compaction"))
  }

  /// Drops every allocation. Outstanding handles become unknown.
  pub fn reset(&mut self) {
    self.allocated.clear();
    self.free.clear();
    self.free.insert_sorted(Segment::new(0, self.capacity));
    self.check();
    debug!("{}: reset", self.id);
  }

  pub fn report(&self) -> Layout<'_> {
    Layout::new(
      self.capacity,
      self.free.as_slice(),
      self.allocated.as_slice(),
    )
  }

  pub fn stats(&self) -> MemoryStats {
    let total_free = self.free.total_len();
    MemoryStats {
      capacity: self.capacity,
      total_free,
      total_used: self.capacity - total_free,
      free_count: self.free.len(),
      used_count: self.allocated.len(),
      largest_free: self.free.largest().unwrap_or(0),
    }
  }

  /// Number of cells behind `handle`, if it names a live allocation here.
  pub fn size_of(
    &self,
    handle: Handle,
  ) -> Option<usize> {
    if handle.space() != self.id {
      return None;
    }
    self
      .allocated
      .position_of(handle.address())
      .map(|index| self.allocated.as_slice()[index].len())
  }

  pub fn contains(
    &self,
    handle: Handle,
  ) -> bool {
    self.size_of(handle).is_some()
  }

  pub fn id(&self) -> SpaceId {
    self.id
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn strategy(&self) -> &S {
    &self.strategy
  }

  pub fn free_segments(&self) -> &[Segment] {
    self.free.as_slice()
  }

  pub fn allocated_segments(&self) -> &[Segment] {
    self.allocated.as_slice()
  }

  /// No-op in release mode.
  #[cfg(not(debug_assertions))]
  fn check(&self) {}

  /// Asserts that both lists are sorted, that they tile `[0, capacity)`, and
  /// that no two free segments touch.
  #[cfg(debug_assertions)]
  fn check(&self) {
    let mut cells: Vec<(Segment, bool)> = self
      .free
      .iter()
      .map(|s| (*s, true))
      .chain(self.allocated.iter().map(|s| (*s, false)))
      .collect();
    cells.sort_by_key(|(s, _)| s.start());

    let mut cursor = 0;
    let mut previous_free = false;
    for (segment, is_free) in cells {
      assert_eq!(segment.start(), cursor, "gap or overlap at {segment}");
      assert!(
        !(previous_free && is_free),
        "adjacent free segments at {segment}"
      );
      cursor = segment.end();
      previous_free = is_free;
    }
    assert_eq!(cursor, self.capacity, "segments do not cover the space");
  }
}

impl<S: Strategy> fmt::Display for AddressSpace<S> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    fmt::Display::fmt(&self.report(), f)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::Tag;

  fn pairs(segments: &[Segment]) -> Vec<(usize, usize)> {
    segments.iter().map(|s| (s.start(), s.len())).collect()
  }

  /// Free segments (0,10) and (20,4), with (10,10) allocated.
  fn fragmented<S: Strategy + Default>() -> AddressSpace<S> {
    let mut space = AddressSpace::<S>::new(24).unwrap();
    let a = space.allocate(10).unwrap();
    space.allocate(10).unwrap();
    let c = space.allocate(4).unwrap();
    space.release(a).unwrap();
    space.release(c).unwrap();
    assert_eq!(pairs(space.free_segments()), vec![(0, 10), (20, 4)]);
    space
  }

  #[test]
  fn test_new_rejects_zero_capacity() {
    assert!(matches!(
      FirstFitSpace::new(0),
      Err(Error::InvalidArgument(_))
    ));
  }

  #[test]
  fn test_new_space_is_one_free_segment() {
    let space = BestFitSpace::new(64).unwrap();

    assert_eq!(pairs(space.free_segments()), vec![(0, 64)]);
    assert!(space.allocated_segments().is_empty());
  }

  #[test]
  fn test_allocate_rejects_zero() {
    let mut space = FirstFitSpace::new(8).unwrap();

    assert!(matches!(space.allocate(0), Err(Error::InvalidArgument(_))));
    assert_eq!(pairs(space.free_segments()), vec![(0, 8)]);
  }

  #[test]
  fn test_first_fit_picks_lowest_address() {
    let mut space = fragmented::<FirstFit>();

    let handle = space.allocate(3).unwrap();

    assert_eq!(handle.address(), 0);
    assert_eq!(pairs(space.free_segments()), vec![(3, 7), (20, 4)]);
  }

  #[test]
  fn test_best_fit_picks_tightest() {
    let mut space = fragmented::<BestFit>();

    let handle = space.allocate(3).unwrap();

    assert_eq!(handle.address(), 20);
    assert_eq!(pairs(space.free_segments()), vec![(0, 10), (23, 1)]);
  }

  #[test]
  fn test_exact_fit_removes_free_segment() {
    let mut space = fragmented::<BestFit>();

    space.allocate(4).unwrap();

    assert_eq!(pairs(space.free_segments()), vec![(0, 10)]);
    assert_eq!(pairs(space.allocated_segments()), vec![(10, 10), (20, 4)]);
  }

  #[test]
  fn test_release_coalesces() {
    let mut space = FirstFitSpace::new(20).unwrap();
    let a = space.allocate(5).unwrap();
    let b = space.allocate(5).unwrap();
    assert_eq!((a.address(), b.address()), (0, 5));

    space.release(a).unwrap();
    space.release(b).unwrap();

    assert_eq!(pairs(space.free_segments()), vec![(0, 20)]);
  }

  #[test]
  fn test_release_merges_both_neighbours() {
    let mut space = FirstFitSpace::new(30).unwrap();
    let a = space.allocate(10).unwrap();
    let b = space.allocate(10).unwrap();
    let c = space.allocate(10).unwrap();
    space.release(a).unwrap();
    space.release(c).unwrap();
    assert_eq!(pairs(space.free_segments()), vec![(0, 10), (20, 10)]);

    space.release(b).unwrap();

    assert_eq!(pairs(space.free_segments()), vec![(0, 30)]);
  }

  #[test]
  fn test_exhaustion() {
    let mut space = FirstFitSpace::new(16).unwrap();
    space.allocate(16).unwrap();

    let err = space.allocate(1).unwrap_err();

    assert!(matches!(
      err,
      Error::OutOfMemory {
        requested: 1,
        largest_free: 0
      }
    ));
    assert!(err.is_recoverable());
  }

  #[test]
  fn test_out_of_memory_leaves_lists_untouched() {
    let mut space = fragmented::<BestFit>();
    let before = (space.free.clone(), space.allocated.clone());

    assert!(matches!(
      space.allocate(11),
      Err(Error::OutOfMemory {
        requested: 11,
        largest_free: 10
      })
    ));
    assert_eq!((space.free.clone(), space.allocated.clone()), before);
  }

  #[test]
  fn test_release_foreign_handle() {
    let mut first = FirstFitSpace::new(8).unwrap();
    let mut second = FirstFitSpace::new(8).unwrap();
    let handle = first.allocate(4).unwrap();
    second.allocate(4).unwrap();

    assert!(matches!(
      second.release(handle),
      Err(Error::InvalidArgument(_))
    ));
    assert_eq!(pairs(second.allocated_segments()), vec![(0, 4)]);
  }

  #[test]
  fn test_original_rejects_clone_handles() {
    let mut original = FirstFitSpace::new(16).unwrap();
    let mut copy = original.clone();
    original.allocate(4).unwrap();
    let from_copy = copy.allocate(4).unwrap();

    assert_ne!(original.id(), copy.id());
    assert!(matches!(
      original.release(from_copy),
      Err(Error::InvalidArgument(_))
    ));
    assert_eq!(pairs(original.allocated_segments()), vec![(0, 4)]);
    assert_eq!(pairs(copy.allocated_segments()), vec![(0, 4)]);
  }

  #[test]
  fn test_clone_copies_layout() {
    let space = fragmented::<BestFit>();

    let copy = space.clone();

    assert_eq!(copy.free_segments(), space.free_segments());
    assert_eq!(copy.allocated_segments(), space.allocated_segments());
  }

  #[test]
  fn test_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<AddressSpace>();
    assert_send_sync::<FirstFitSpace>();
    assert_send_sync::<BestFitSpace>();
    assert_send_sync::<Handle>();
  }

  #[test]
  fn test_release_twice_is_not_found() {
    let mut space = FirstFitSpace::new(8).unwrap();
    let handle = space.allocate(4).unwrap();
    space.release(handle).unwrap();

    assert!(matches!(space.release(handle), Err(Error::NotFound(h)) if h == handle));
    assert_eq!(pairs(space.free_segments()), vec![(0, 8)]);
  }

  #[test]
  fn test_round_trip() {
    let mut space = BestFitSpace::new(100).unwrap();

    let handle = space.allocate(42).unwrap();
    space.release(handle).unwrap();

    assert_eq!(pairs(space.free_segments()), vec![(0, 100)]);
    assert!(space.allocated_segments().is_empty());
  }

  #[test]
  fn test_compact_is_not_implemented() {
    let mut space = fragmented::<FirstFit>();

    assert!(matches!(space.compact(), Err(Error::NotImplemented(_))));
    assert_eq!(pairs(space.free_segments()), vec![(0, 10), (20, 4)]);
  }

  #[test]
  fn test_reset_forgets_handles() {
    let mut space = FirstFitSpace::new(8).unwrap();
    let handle = space.allocate(3).unwrap();

    space.reset();

    assert!(!space.contains(handle));
    assert!(matches!(space.release(handle), Err(Error::NotFound(_))));
    assert_eq!(pairs(space.free_segments()), vec![(0, 8)]);
  }

  #[test]
  fn test_size_of() {
    let mut space = FirstFitSpace::new(8).unwrap();
    let other = FirstFitSpace::new(8).unwrap();
    let handle = space.allocate(3).unwrap();

    assert_eq!(space.size_of(handle), Some(3));
    assert_eq!(other.size_of(handle), None);
  }

  #[test]
  fn test_stats() {
    let space = fragmented::<FirstFit>();

    let stats = space.stats();

    assert_eq!(stats.total_free, 14);
    assert_eq!(stats.total_used, 10);
    assert_eq!(stats.free_count, 2);
    assert_eq!(stats.used_count, 1);
    assert_eq!(stats.largest_free, 10);
  }

  #[test]
  fn test_report() {
    let space = fragmented::<FirstFit>();

    let ranges: Vec<_> = space.report().iter().map(|r| (r.start, r.end, r.tag)).collect();

    assert_eq!(
      ranges,
      vec![
        (0, 10, Tag::Free),
        (10, 20, Tag::Allocated),
        (20, 24, Tag::Free),
      ]
    );
    assert_eq!(space.to_string(), "0 - 10 Free\n10 - 20 Allocated\n20 - 24 Free\n");
  }

  #[test]
  fn test_with_mode() {
    let mut space = AddressSpace::with_mode(24, SearchMode::BestFit).unwrap();
    let a = space.allocate(10).unwrap();
    space.allocate(10).unwrap();
    let c = space.allocate(4).unwrap();
    space.release(a).unwrap();
    space.release(c).unwrap();

    assert_eq!(space.allocate(3).unwrap().address(), 20);
    assert_eq!(space.strategy().name(), "best-fit");
  }
}
