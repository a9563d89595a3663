//! Printable view of an address space.
//!
//! A [`Layout`] borrows the two segment lists and derives ranges from them on
//! every iteration; nothing is cached, so iterating twice without an
//! intervening mutation yields the same ranges.

use std::{fmt, slice};

use crate::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
  Allocated,
  Free,
}

impl fmt::Display for Tag {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(match self {
      Self::Allocated => "Allocated",
      Self::Free => "Free",
    })
  }
}

/// Cells `[start, end)`, all carrying `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutRange {
  pub start: usize,
  pub end: usize,
  pub tag: Tag,
}

impl LayoutRange {
  fn new(
    start: usize,
    end: usize,
    tag: Tag,
  ) -> Self {
    Self { start, end, tag }
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

impl fmt::Display for LayoutRange {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{} - {} {}", self.start, self.end, self.tag)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
  capacity: usize,
  free: &'a [Segment],
  allocated: &'a [Segment],
}

impl<'a> Layout<'a> {
  pub(crate) fn new(
    capacity: usize,
    free: &'a [Segment],
    allocated: &'a [Segment],
  ) -> Self {
    Self {
      capacity,
      free,
      allocated,
    }
  }

  pub fn iter(&self) -> LayoutIter<'a> {
    LayoutIter {
      capacity: self.capacity,
      free: self.free,
      allocated: self.allocated.iter(),
      next_free: 0,
      cursor: 0,
    }
  }

  /// Column-aligned rendering, one `| start - end | tag` row per range.
  pub fn table(&self) -> Table<'a> {
    Table(*self)
  }
}

impl<'a> IntoIterator for Layout<'a> {
  type Item = LayoutRange;
  type IntoIter = LayoutIter<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<'a> IntoIterator for &Layout<'a> {
  type Item = LayoutRange;
  type IntoIter = LayoutIter<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl fmt::Display for Layout<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    for range in self {
      writeln!(f, "{range}")?;
    }
    Ok(())
  }
}

pub struct LayoutIter<'a> {
  capacity: usize,
  free: &'a [Segment],
  allocated: slice::Iter<'a, Segment>,
  next_free: usize,
  cursor: usize,
}

impl Iterator for LayoutIter<'_> {
  type Item = LayoutRange;

  fn next(&mut self) -> Option<LayoutRange> {
    // A fully allocated space lists every allocation on its own.
    if self.free.is_empty() {
      return self
        .allocated
        .next()
        .map(|s| LayoutRange::new(s.start(), s.end(), Tag::Allocated));
    }

    if self.cursor >= self.capacity {
      return None;
    }

    // Between two free segments everything is allocated.
    let range = match self.free.get(self.next_free) {
      Some(free) if free.start() == self.cursor => {
        self.next_free += 1;
        LayoutRange::new(free.start(), free.end(), Tag::Free)
      }
      Some(free) => LayoutRange::new(self.cursor, free.start(), Tag::Allocated),
      None => LayoutRange::new(self.cursor, self.capacity, Tag::Allocated),
    };
    self.cursor = range.end;
    Some(range)
  }
}

pub struct Table<'a>(Layout<'a>);

impl fmt::Display for Table<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let width = self.0.capacity.to_string().len();
    for range in &self.0 {
      writeln!(
        f,
        "| {:>width$} - {:>width$} | {}",
        range.start, range.end, range.tag
      )?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ranges(layout: Layout<'_>) -> Vec<(usize, usize, Tag)> {
    layout.iter().map(|r| (r.start, r.end, r.tag)).collect()
  }

  #[test]
  fn test_alternating_ranges() {
    let free = [Segment::new(3, 2), Segment::new(8, 4)];
    let allocated = [Segment::new(0, 3), Segment::new(5, 3), Segment::new(12, 4)];
    let layout = Layout::new(16, &free, &allocated);

    assert_eq!(
      ranges(layout),
      vec![
        (0, 3, Tag::Allocated),
        (3, 5, Tag::Free),
        (5, 8, Tag::Allocated),
        (8, 12, Tag::Free),
        (12, 16, Tag::Allocated),
      ]
    );
  }

  #[test]
  fn test_adjacent_allocations_report_as_one_range() {
    let free = [Segment::new(10, 6)];
    let allocated = [Segment::new(0, 4), Segment::new(4, 6)];
    let layout = Layout::new(16, &free, &allocated);

    assert_eq!(
      ranges(layout),
      vec![(0, 10, Tag::Allocated), (10, 16, Tag::Free)]
    );
  }

  #[test]
  fn test_full_space_lists_each_allocation() {
    let allocated = [Segment::new(0, 4), Segment::new(4, 6)];
    let layout = Layout::new(10, &[], &allocated);

    assert_eq!(
      ranges(layout),
      vec![(0, 4, Tag::Allocated), (4, 10, Tag::Allocated)]
    );
  }

  #[test]
  fn test_restartable() {
    let free = [Segment::new(0, 4)];
    let allocated = [Segment::new(4, 4)];
    let layout = Layout::new(8, &free, &allocated);

    assert_eq!(ranges(layout), ranges(layout));
    assert_eq!(layout.to_string(), "0 - 4 Free\n4 - 8 Allocated\n");
  }

  #[test]
  fn test_table() {
    let free = [Segment::new(111, 40), Segment::new(1000, 24)];
    let allocated = [Segment::new(0, 111), Segment::new(151, 849)];
    let layout = Layout::new(1024, &free, &allocated);

    insta::assert_snapshot!(layout.table().to_string(), @r###"
    |    0 -  111 | Allocated
    |  111 -  151 | Free
    |  151 - 1000 | Allocated
    | 1000 - 1024 | Free
    "###);
  }
}
