//! # fitsim - A Contiguous Allocation Simulator
//!
//! This crate simulates **first-fit** and **best-fit** allocation over a fixed
//! linear address space. Nothing is ever backed by real memory: the simulator
//! only tracks which cells are free and which are allocated, so the effect of
//! each policy on the layout can be inspected.
//!
//! ## Overview
//!
//! An address space of `N` cells is split into segments. Each segment sits on
//! exactly one of two address-sorted lists:
//!
//! ```text
//!   Address Space (N = 32):
//!
//!   ┌────────┬──────────────┬──────┬────────────────┬───────────────┐
//!   │   A1   │     free     │  A2  │       A3       │     free      │
//!   └────────┴──────────────┴──────┴────────────────┴───────────────┘
//!   0        6              14     18               26              32
//!
//!   free list:      [6, 14)  [26, 32)
//!   allocated list: [0, 6)   [14, 18)  [18, 26)
//! ```
//!
//! Together the lists cover `[0, N)` with no gap and no overlap, and no two
//! free segments ever touch: a release merges the returned cells with any
//! free neighbour.
//!
//! ## Strategies
//!
//! The policies only differ in which free segment serves a request:
//!
//! ```text
//!   free list:  [0, 10)          [20, 24)        request: 3 cells
//!
//!   first-fit:  ▲ lowest address that is large enough
//!   best-fit:                    ▲ smallest remainder (ties: lowest address)
//! ```
//!
//! The chosen segment is then split: the front `size` cells become the
//! allocation and the rest stays free in place.
//!
//! ## Crate Structure
//!
//! ```text
//!   fitsim
//!   ├── segment       - Segment, a non-empty cell range
//!   ├── segment_list  - Address-sorted list with insert/coalesce/take
//!   ├── strategy      - FirstFit, BestFit and the runtime SearchMode
//!   ├── space         - AddressSpace: allocate, release, report
//!   ├── handle        - Handle and SpaceId
//!   ├── layout        - Allocated/Free range view and its renderings
//!   ├── stats         - Occupancy figures
//!   ├── config        - TOML settings
//!   └── script        - Command language used by the `fitsim` binary
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitsim::{BestFitSpace, Tag};
//!
//! let mut space = BestFitSpace::new(24)?;
//! let a = space.allocate(10)?;
//! let _b = space.allocate(10)?;
//! let c = space.allocate(4)?;
//! space.release(a)?;
//! space.release(c)?;
//!
//! // [20, 24) leaves a smaller remainder than [0, 10).
//! assert_eq!(space.allocate(3)?.address(), 20);
//!
//! let layout: Vec<_> = space.report().iter().map(|r| r.tag).collect();
//! assert_eq!(layout, [Tag::Free, Tag::Allocated, Tag::Free]);
//! # Ok::<(), fitsim::Error>(())
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded**: mutation takes `&mut self`; wrap a space in a
//!   `Mutex` to share it
//! - **No compaction**: [`AddressSpace::compact`] reports
//!   [`Error::NotImplemented`]

pub mod config;
mod error;
mod handle;
mod layout;
pub mod script;
mod segment;
mod segment_list;
mod space;
mod stats;
mod strategy;

pub use config::Config;
pub use error::{Error, Result};
pub use handle::{Handle, SpaceId};
pub use layout::{Layout, LayoutIter, LayoutRange, Table, Tag};
pub use segment::Segment;
pub use space::{AddressSpace, BestFitSpace, FirstFitSpace};
pub use stats::MemoryStats;
pub use strategy::{BestFit, FirstFit, SearchMode, Strategy};
