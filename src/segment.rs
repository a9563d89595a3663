use std::fmt;

/// A contiguous, non-empty run of cells `[start, start + len)`.
///
/// Whether a segment is free or allocated is decided by the list that holds
/// it, never by the segment itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
  start: usize,
  len: usize,
}

impl Segment {
  pub fn new(
    start: usize,
    len: usize,
  ) -> Self {
    debug_assert!(len > 0, "empty segment at {start}");
    Self { start, len }
  }

  pub fn start(&self) -> usize {
    self.start
  }

  pub fn len(&self) -> usize {
    self.len
  }

  /// Always false for a segment built through [`Segment::new`].
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// One past the last cell.
  pub fn end(&self) -> usize {
    self.start + self.len
  }

  /// `next` begins exactly where `self` ends.
  pub fn is_adjacent_to(
    &self,
    next: &Segment,
  ) -> bool {
    self.end() == next.start
  }

  /// Cuts `size` cells off the front, returning them as a new segment.
  ///
  /// The remainder keeps its place: its start only moves forward, so an
  /// address-sorted list stays sorted.
  pub(crate) fn split_front(
    &mut self,
    size: usize,
  ) -> Segment {
    debug_assert!(size < self.len);
    let front = Segment::new(self.start, size);
    self.start += size;
    self.len -= size;
    front
  }

  pub(crate) fn absorb(
    &mut self,
    next: Segment,
  ) {
    debug_assert!(self.is_adjacent_to(&next));
    self.len += next.len;
  }
}

impl fmt::Display for Segment {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "[{}, {})", self.start, self.end())
  }
}
