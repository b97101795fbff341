//! Free-block selection policies.
//!
//! Every policy answers the same question: given the block list and an
//! already aligned request, which free block with `size >= request` should
//! serve it? Exactly one policy is active for the lifetime of a heap.

use std::{fmt, str::FromStr};

use log::trace;

use crate::{block::BlockPtr, error::ParseSearchModeError, list::BlockList};

/// Which fit strategy a heap searches with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchMode {
  /// First free block large enough, scanning from the head.
  #[default]
  First,
  /// Smallest free block large enough. Ties go to the lowest address.
  Best,
  /// Largest free block large enough. Ties go to the lowest address.
  Worst,
  /// First fit, resumed from where the previous search stopped.
  Next,
}

impl SearchMode {
  pub const ALL: [SearchMode; 4] = [Self::First, Self::Best, Self::Worst, Self::Next];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::First => "first",
      Self::Best => "best",
      Self::Worst => "worst",
      Self::Next => "next",
    }
  }

  /// Byte-level parse usable before the process has a working allocator.
  pub fn from_bytes(name: &[u8]) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|mode| mode.as_str().as_bytes().eq_ignore_ascii_case(name))
  }
}

impl fmt::Display for SearchMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SearchMode {
  type Err = ParseSearchModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_bytes(s.trim().as_bytes())
      .ok_or_else(|| ParseSearchModeError { input: s.to_owned() })
  }
}

/// Capability shared by the fit strategies.
pub trait Fit {
  /// Picks a free block of at least `size` payload bytes.
  fn find(
    &mut self,
    list: &BlockList,
    size: usize,
  ) -> Option<BlockPtr>;

  /// Called when coalescing folds `absorbed` into `survivor`.
  fn absorbed(
    &mut self,
    _absorbed: BlockPtr,
    _survivor: BlockPtr,
  ) {
  }
}

fn fits(
  block: BlockPtr,
  size: usize,
) -> bool {
  block.is_free() && block.size() >= size
}

#[derive(Debug, Default)]
pub struct FirstFit;

impl Fit for FirstFit {
  fn find(
    &mut self,
    list: &BlockList,
    size: usize,
  ) -> Option<BlockPtr> {
    list.iter().find(|&block| fits(block, size))
  }
}

#[derive(Debug, Default)]
pub struct BestFit;

impl Fit for BestFit {
  fn find(
    &mut self,
    list: &BlockList,
    size: usize,
  ) -> Option<BlockPtr> {
    let mut best: Option<(BlockPtr, usize)> = None;

    for block in list.iter().filter(|&block| fits(block, size)) {
      let candidate = block.size();
      if best.is_none_or(|(_, smallest)| candidate < smallest) {
        best = Some((block, candidate));
      }
    }

    best.map(|(block, _)| block)
  }
}

#[derive(Debug, Default)]
pub struct WorstFit;

impl Fit for WorstFit {
  fn find(
    &mut self,
    list: &BlockList,
    size: usize,
  ) -> Option<BlockPtr> {
    let mut worst: Option<(BlockPtr, usize)> = None;

    for block in list.iter().filter(|&block| fits(block, size)) {
      let candidate = block.size();
      if worst.is_none_or(|(_, largest)| candidate > largest) {
        worst = Some((block, candidate));
      }
    }

    worst.map(|(block, _)| block)
  }
}

/// First fit with a persistent cursor.
///
/// The scan starts at the block where the previous search stopped and does
/// not wrap. A miss leaves the cursor past the end, which sends the next
/// search back to the head.
#[derive(Debug, Default)]
pub struct NextFit {
  cursor: Option<BlockPtr>,
}

impl Fit for NextFit {
  fn find(
    &mut self,
    list: &BlockList,
    size: usize,
  ) -> Option<BlockPtr> {
    let start = self.cursor.or(list.first());
    let found = list.iter_from(start).find(|&block| fits(block, size));
    self.cursor = found;
    found
  }

  fn absorbed(
    &mut self,
    absorbed: BlockPtr,
    survivor: BlockPtr,
  ) {
    if self.cursor == Some(absorbed) {
      self.cursor = Some(survivor);
    }
  }
}

/// The single strategy a heap was built with.
#[derive(Debug)]
pub enum Policy {
  First(FirstFit),
  Best(BestFit),
  Worst(WorstFit),
  Next(NextFit),
}

impl Policy {
  pub fn new(mode: SearchMode) -> Self {
    match mode {
      SearchMode::First => Self::First(FirstFit),
      SearchMode::Best => Self::Best(BestFit),
      SearchMode::Worst => Self::Worst(WorstFit),
      SearchMode::Next => Self::Next(NextFit::default()),
    }
  }

  pub fn mode(&self) -> SearchMode {
    match self {
      Self::First(_) => SearchMode::First,
      Self::Best(_) => SearchMode::Best,
      Self::Worst(_) => SearchMode::Worst,
      Self::Next(_) => SearchMode::Next,
    }
  }

  fn as_fit(&mut self) -> &mut dyn Fit {
    match self {
      Self::First(fit) => fit,
      Self::Best(fit) => fit,
      Self::Worst(fit) => fit,
      Self::Next(fit) => fit,
    }
  }
}

impl Fit for Policy {
  fn find(
    &mut self,
    list: &BlockList,
    size: usize,
  ) -> Option<BlockPtr> {
    let mode = self.mode();
    let found = self.as_fit().find(list, size);
    trace!("{mode}-fit search for {size} bytes -> {found:?}");
    found
  }

  fn absorbed(
    &mut self,
    absorbed: BlockPtr,
    survivor: BlockPtr,
  ) {
    self.as_fit().absorbed(absorbed, survivor);
  }
}
