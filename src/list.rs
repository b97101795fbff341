use std::ptr::NonNull;

use crate::block::{BlockPtr, HEADER_SIZE};

/// Address-ordered chain of every block in the managed heap, free or not.
///
/// ```text
///   first                                              last
///     │                                                  │
///     ▼                                                  ▼
///   ┌────┬─────────┐   ┌────┬─────┐   ┌────┬─────────────┐
///   │ H  │ in use  │──▶│ H  │free │──▶│ H  │   in use    │──▶ null
///   └────┴─────────┘   └────┴─────┘   └────┴─────────────┘
///   low address                                 high address
/// ```
pub struct BlockList {
  first: Option<BlockPtr>,
  last: Option<BlockPtr>,
}

impl BlockList {
  pub const fn new() -> Self {
    Self {
      first: None,
      last: None,
    }
  }

  pub fn first(&self) -> Option<BlockPtr> {
    self.first
  }

  pub fn iter(&self) -> Iter {
    Iter { current: self.first }
  }

  /// Walks from `start` instead of the head.
  pub fn iter_from(
    &self,
    start: Option<BlockPtr>,
  ) -> Iter {
    Iter { current: start }
  }

  pub fn len(&self) -> usize {
    self.iter().count()
  }

  /// Links `block` as the new tail. The block must lie past the current tail.
  pub fn push_back(
    &mut self,
    block: BlockPtr,
  ) {
    block.set_next(None);

    match self.last {
      Some(last) => {
        debug_assert!(block.addr() >= last.end(), "heap growth went backwards");
        last.set_next(Some(block));
      }
      None => self.first = Some(block),
    }

    self.last = Some(block);
  }

  /// Links `block` directly behind `parent`, taking over its old successor.
  pub fn insert_after(
    &mut self,
    parent: BlockPtr,
    block: BlockPtr,
  ) {
    debug_assert!(block.addr() >= parent.end());

    block.set_next(parent.next());
    parent.set_next(Some(block));

    if self.last == Some(parent) {
      self.last = Some(block);
    }
  }

  /// Folds the successor of `block` into it and splices the successor out.
  ///
  /// The successor's header and payload become part of `block`'s payload, so
  /// the successor must start exactly where `block` ends.
  /// Returns the absorbed block, or `None` when `block` is the tail.
  pub fn absorb_next(
    &mut self,
    block: BlockPtr,
  ) -> Option<BlockPtr> {
    let absorbed = block.next()?;
    debug_assert_eq!(block.end(), absorbed.addr(), "merged blocks across a gap");

    block.set_size(block.size() + absorbed.size() + HEADER_SIZE);
    block.set_next(absorbed.next());

    if self.last == Some(absorbed) {
      self.last = Some(block);
    }

    Some(absorbed)
  }

  /// Recovers the block whose payload starts at `payload`.
  ///
  /// Only addresses previously handed out for a listed block are accepted, so
  /// a stray pointer is detected instead of being treated as a header.
  pub fn locate(
    &self,
    payload: NonNull<u8>,
  ) -> Option<BlockPtr> {
    self.iter().find(|block| block.payload() == payload)
  }

  /// Finds the block whose payload range holds `addr`, if any.
  pub fn containing(
    &self,
    addr: usize,
  ) -> Option<BlockPtr> {
    self
      .iter()
      .take_while(|block| block.addr() <= addr)
      .find(|block| (block.payload().as_ptr() as usize..block.end()).contains(&addr))
  }
}

impl Default for BlockList {
  fn default() -> Self {
    Self::new()
  }
}

pub struct Iter {
  current: Option<BlockPtr>,
}

impl Iterator for Iter {
  type Item = BlockPtr;

  fn next(&mut self) -> Option<Self::Item> {
    let block = self.current?;
    self.current = block.next();
    Some(block)
  }
}
