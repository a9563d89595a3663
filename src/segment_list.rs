use std::slice;

use log::trace;

use crate::segment::Segment;

/// Segments sorted ascending by start address.
///
/// Starts are unique within a list and entries never overlap. The free list
/// additionally keeps no two entries adjacent, which [`coalesce_adjacent`]
/// restores after every insertion.
///
/// [`coalesce_adjacent`]: SegmentList::coalesce_adjacent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SegmentList {
  segments: Vec<Segment>,
}

impl SegmentList {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn single(segment: Segment) -> Self {
    Self {
      segments: vec![segment],
    }
  }

  pub(crate) fn as_slice(&self) -> &[Segment] {
    &self.segments
  }

  pub(crate) fn iter(&self) -> slice::Iter<'_, Segment> {
    self.segments.iter()
  }

  pub(crate) fn len(&self) -> usize {
    self.segments.len()
  }

  /// Sum of the lengths of all entries.
  pub(crate) fn total_len(&self) -> usize {
    self.segments.iter().map(Segment::len).sum()
  }

  /// Length of the longest entry, if any.
  pub(crate) fn largest(&self) -> Option<usize> {
    self.segments.iter().map(Segment::len).max()
  }

  /// Index of the entry starting at `start`.
  pub(crate) fn position_of(
    &self,
    start: usize,
  ) -> Option<usize> {
    self.segments.binary_search_by_key(&start, Segment::start).ok()
  }

  /// Inserts `segment` in front of the first entry that starts after it.
  pub(crate) fn insert_sorted(
    &mut self,
    segment: Segment,
  ) -> usize {
    let index = self
      .segments
      .partition_point(|s| s.start() < segment.start());
    debug_assert!(
      self.segments.get(index).is_none_or(|s| s.start() != segment.start()),
      "duplicate start {}",
      segment.start()
    );
    self.segments.insert(index, segment);
    index
  }

  /// Merges every run of adjacent entries into one, returning the number of
  /// merges performed.
  pub(crate) fn coalesce_adjacent(&mut self) -> usize {
    let mut merged = 0;
    let mut i = 0;
    while i + 1 < self.segments.len() {
      if self.segments[i].is_adjacent_to(&self.segments[i + 1]) {
        let next = self.segments.remove(i + 1);
        trace!("coalescing {} into {}", next, self.segments[i]);
        self.segments[i].absorb(next);
        merged += 1;
      } else {
        i += 1;
      }
    }
    merged
  }

  /// Carves `size` cells off the front of the entry at `index`.
  ///
  /// The entry shrinks in place when it is larger than `size` and is removed
  /// when it matches exactly.
  pub(crate) fn take(
    &mut self,
    index: usize,
    size: usize,
  ) -> Segment {
    let segment = &mut self.segments[index];
    debug_assert!(segment.len() >= size);
    if segment.len() == size {
      self.segments.remove(index)
    } else {
      segment.split_front(size)
    }
  }

  pub(crate) fn remove(
    &mut self,
    index: usize,
  ) -> Segment {
    self.segments.remove(index)
  }

  pub(crate) fn clear(&mut self) {
    self.segments.clear();
  }
}

impl<'a> IntoIterator for &'a SegmentList {
  type Item = &'a Segment;
  type IntoIter = slice::Iter<'a, Segment>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
