//! The allocator context.
//!
//! A [`Heap`] owns everything a `malloc` implementation keeps in globals: the
//! block list, the fit policy (with its cursor) and the lifetime counters.
//! Several heaps can coexist, each backed by its own [`Grower`].

use std::ptr::{self, NonNull};

use libc::STDERR_FILENO;
use log::{debug, error};

use crate::{
  align::{WORD, align4},
  block::{Block, BlockPtr, HEADER_SIZE},
  config::{Config, FaultPolicy},
  error::Fault,
  grow::Grower,
  list::BlockList,
  search::{Fit, Policy, SearchMode},
  stats::{self, Stats},
};

/// Read-only view of one block, as yielded by [`Heap::blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Address the block's payload starts at.
  pub payload: NonNull<u8>,
  /// Payload bytes, header excluded.
  pub size: usize,
  pub is_free: bool,
}

pub struct Heap<G: Grower> {
  grower: G,
  list: BlockList,
  policy: Policy,
  stats: Stats,
  on_fault: FaultPolicy,
}

impl<G: Grower> Heap<G> {
  pub fn new(
    grower: G,
    search: SearchMode,
  ) -> Self {
    Self::with_config(grower, Config::new(search))
  }

  pub fn with_config(
    grower: G,
    config: Config,
  ) -> Self {
    Self {
      grower,
      list: BlockList::new(),
      policy: Policy::new(config.search),
      stats: Stats::default(),
      on_fault: config.on_fault,
    }
  }

  pub fn search_mode(&self) -> SearchMode {
    self.policy.mode()
  }

  pub fn grower(&self) -> &G {
    &self.grower
  }

  /// Hands out at least `size` bytes, rounded up to a multiple of 4.
  ///
  /// Returns `None` for a zero-byte request, when the rounded size overflows,
  /// or when the grower refuses to extend the heap.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    self.stats.requested = self.stats.requested.saturating_add(size);

    let size = align4(size)?;

    if size == 0 {
      return None;
    }

    let block = match self.policy.find(&self.list, size) {
      Some(block) => {
        self.split(block, size);
        self.stats.reuses += 1;
        debug!("reusing {block:?} for {size} bytes");
        block
      }
      None => {
        let block = self.grow(size)?;
        self.stats.max_heap += size;
        block
      }
    };

    block.set_free(false);
    self.stats.mallocs += 1;

    Some(block.payload())
  }

  /// Returns a block to the heap and runs one coalescing pass.
  ///
  /// `None` is a no-op. Releasing an address that is not a live allocation
  /// of this heap is a fault.
  pub fn release(
    &mut self,
    ptr: Option<NonNull<u8>>,
  ) {
    let Some(ptr) = ptr else {
      return;
    };

    let block = self.live_block(ptr);

    block.set_free(true);
    self.stats.frees += 1;

    self.coalesce();
  }

  /// Allocates `count * size` bytes and zeroes them.
  pub fn allocate_zeroed(
    &mut self,
    count: usize,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let total = count.checked_mul(size)?;
    let ptr = self.allocate(total)?;

    // `allocate` succeeded, so the rounded size exists.
    let zeroed = align4(total).unwrap_or(total);
    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, zeroed) };

    Some(ptr)
  }

  /// Moves an allocation into a block of `size` bytes.
  ///
  /// Copies `min(old size, size)` bytes and releases the old block. `None`
  /// behaves like [`allocate`](Self::allocate); a `size` of zero releases the
  /// old block and returns `None`. If the new block cannot be obtained the
  /// old one is left untouched.
  pub fn reallocate(
    &mut self,
    ptr: Option<NonNull<u8>>,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let Some(old) = ptr else {
      return self.allocate(size);
    };

    let block = self.live_block(old);

    if size == 0 {
      self.release(Some(old));
      return None;
    }

    let new = self.allocate(size)?;
    let copied = block.size().min(size);

    // SAFETY: both blocks are live and distinct, and neither payload is
    // shorter than `copied`.
    unsafe { ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), copied) };

    self.release(Some(old));

    Some(new)
  }

  /// Payload bytes behind a live allocation, or 0 for `None`.
  pub fn usable_size(
    &self,
    ptr: Option<NonNull<u8>>,
  ) -> usize {
    ptr.map_or(0, |ptr| self.live_block(ptr).size())
  }

  /// Walks the block list in address order.
  pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
    self.list.iter().map(|block| {
      let header = block.read();
      BlockInfo {
        payload: block.payload(),
        size: header.size,
        is_free: header.is_free,
      }
    })
  }

  /// Counters so far, with `blocks` set to the current list length.
  pub fn statistics(&self) -> Stats {
    Stats {
      blocks: self.list.len(),
      ..self.stats
    }
  }

  /// Extends the heap by one header plus `size` payload bytes and appends the
  /// new, in-use block to the list.
  fn grow(
    &mut self,
    size: usize,
  ) -> Option<BlockPtr> {
    let bytes = HEADER_SIZE.checked_add(size)?;
    let addr = self.grower.grow(bytes)?;

    // SAFETY: the grower handed us `bytes` fresh bytes starting at `addr`.
    let block = unsafe { BlockPtr::init(addr, Block::new(size, false, ptr::null_mut())) };
    self.list.push_back(block);
    self.stats.grows += 1;

    debug!("grew heap by {bytes} bytes: {block:?}");

    Some(block)
  }

  /// Trims `block` down to `size` when the leftover can hold a header and at
  /// least one word of payload. The leftover becomes a free block right
  /// behind it.
  fn split(
    &mut self,
    block: BlockPtr,
    size: usize,
  ) {
    let available = block.size();

    if available < size.saturating_add(HEADER_SIZE + WORD) {
      return;
    }

    // SAFETY: the remainder lies inside `block`'s payload, past the first
    // `size` bytes, and has room for a header.
    let remainder = unsafe {
      let addr = block.payload().add(size);
      BlockPtr::init(
        addr,
        Block::new(available - size - HEADER_SIZE, true, ptr::null_mut()),
      )
    };

    block.set_size(size);
    self.list.insert_after(block, remainder);
    self.stats.splits += 1;

    debug!("split {available} bytes into {size} + {remainder:?}");
  }

  /// One pass over the whole list merging each free block with a free
  /// successor.
  ///
  /// After a merge the scan moves on to the merged block's new successor, so
  /// a run of three or more free blocks may need further passes to collapse
  /// fully.
  fn coalesce(&mut self) {
    let mut current = self.list.first();

    while let Some(block) = current {
      if block.is_free() {
        // Blocks from separate grows may have foreign memory between them.
        let touching = |next: &BlockPtr| next.is_free() && next.addr() == block.end();

        if let Some(next) = block.next().filter(touching) {
          self.list.absorb_next(block);
          self.policy.absorbed(next, block);
          self.stats.coalesces += 1;

          debug!("coalesced into {block:?}");
        }
      }

      current = block.next();
    }
  }

  /// Recovers the header of a live allocation, faulting on anything else.
  fn live_block(
    &self,
    ptr: NonNull<u8>,
  ) -> BlockPtr {
    let addr = ptr.as_ptr() as usize;

    let Some(block) = self.list.locate(ptr) else {
      // A block released earlier may since have been merged into a free
      // neighbour, so its payload address now lies inside that neighbour.
      if self.list.containing(addr).is_some_and(|block| block.is_free()) {
        self.fault(Fault::DoubleFree { addr });
      }
      self.fault(Fault::ForeignPointer { addr });
    };

    if block.is_free() {
      self.fault(Fault::DoubleFree { addr });
    }

    block
  }

  #[cold]
  fn fault(
    &self,
    fault: Fault,
  ) -> ! {
    error!("{fault}");

    match self.on_fault {
      FaultPolicy::Panic => panic!("{fault}"),
      FaultPolicy::Abort => {
        stats::write_fd(STDERR_FILENO, format_args!("rallocator: {fault}\n"));
        unsafe { libc::abort() }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::slice;

  use super::*;
  use crate::grow::ArenaGrower;

  fn heap(mode: SearchMode) -> Heap<ArenaGrower> {
    Heap::new(ArenaGrower::with_capacity(4096), mode)
  }

  /// Arena that lets someone else claim `GAP` bytes before every grow, like a
  /// foreign `brk` user moving the program break between two of ours.
  struct GappedGrower(ArenaGrower);

  const GAP: usize = 16;
  const GAP_FILL: u8 = 0x5A;

  unsafe impl Grower for GappedGrower {
    fn grow(
      &mut self,
      bytes: usize,
    ) -> Option<NonNull<u8>> {
      let foreign = self.0.grow(GAP)?;
      unsafe { foreign.as_ptr().write_bytes(GAP_FILL, GAP) };
      self.0.grow(bytes)
    }
  }

  fn layout<G: Grower>(heap: &Heap<G>) -> Vec<(usize, bool)> {
    heap.blocks().map(|block| (block.size, block.is_free)).collect()
  }

  fn fill(
    ptr: NonNull<u8>,
    len: usize,
    byte: u8,
  ) {
    unsafe { ptr::write_bytes(ptr.as_ptr(), byte, len) };
  }

  fn bytes<'a>(
    ptr: NonNull<u8>,
    len: usize,
  ) -> &'a [u8] {
    unsafe { slice::from_raw_parts(ptr.as_ptr(), len) }
  }

  /// Free blocks of 40, 16 and 64 bytes, each followed by an 8-byte
  /// allocation so none of them can coalesce.
  fn fragmented(mode: SearchMode) -> (Heap<ArenaGrower>, [NonNull<u8>; 3]) {
    let mut heap = heap(mode);

    let a = heap.allocate(40).unwrap();
    heap.allocate(8).unwrap();
    let b = heap.allocate(16).unwrap();
    heap.allocate(8).unwrap();
    let c = heap.allocate(64).unwrap();
    heap.allocate(8).unwrap();

    heap.release(Some(a));
    heap.release(Some(b));
    heap.release(Some(c));

    assert_eq!(heap.statistics().coalesces, 0);

    (heap, [a, b, c])
  }

  #[test]
  fn test_zero_size_returns_none() {
    let mut heap = heap(SearchMode::First);

    assert!(heap.allocate(0).is_none());

    let stats = heap.statistics();
    assert_eq!(stats.mallocs, 0);
    assert_eq!(stats.grows, 0);
    assert_eq!(stats.blocks, 0);
  }

  #[test]
  fn test_sizes_round_up_to_word() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.allocate(13).unwrap();

    assert_eq!(heap.usable_size(Some(ptr)), 16);
    assert_eq!(heap.statistics().requested, 13);
    assert_eq!(heap.statistics().max_heap, 16);
    assert_eq!(heap.grower().used(), HEADER_SIZE + 16);
  }

  #[test]
  fn test_growth_appends_in_address_order() {
    let mut heap = heap(SearchMode::First);

    let first = heap.allocate(8).unwrap();
    let second = heap.allocate(20).unwrap();
    let third = heap.allocate(4).unwrap();

    assert_eq!(second.as_ptr() as usize, first.as_ptr() as usize + 8 + HEADER_SIZE);
    assert_eq!(third.as_ptr() as usize, second.as_ptr() as usize + 20 + HEADER_SIZE);

    let payloads: Vec<_> = heap.blocks().map(|block| block.payload).collect();
    assert_eq!(payloads, vec![first, second, third]);
    assert_eq!(heap.statistics().grows, 3);
  }

  #[test]
  fn test_writes_stay_inside_payload() {
    let mut heap = heap(SearchMode::First);

    let first = heap.allocate(10).unwrap();
    let second = heap.allocate(10).unwrap();

    fill(second, 12, 0x22);
    fill(first, 12, 0x11);

    assert!(bytes(first, 12).iter().all(|&b| b == 0x11));
    assert!(bytes(second, 12).iter().all(|&b| b == 0x22));
    assert_eq!(layout(&heap), vec![(12, false), (12, false)]);
  }

  #[test]
  fn test_release_none_is_noop() {
    let mut heap = heap(SearchMode::First);

    heap.release(None);

    assert_eq!(heap.statistics().frees, 0);
  }

  #[test]
  fn test_release_keeps_block_listed_as_free() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.allocate(24).unwrap();
    heap.release(Some(ptr));

    assert_eq!(layout(&heap), vec![(24, true)]);
    assert_eq!(heap.statistics().frees, 1);
  }

  #[test_log::test]
  fn test_repeat_cycles_do_not_grow() {
    let mut heap = heap(SearchMode::First);

    for _ in 0..10 {
      let ptr = heap.allocate(40);
      assert!(ptr.is_some());
      heap.release(ptr);
    }

    let stats = heap.statistics();
    assert_eq!(stats.grows, 1);
    assert_eq!(stats.reuses, 9);
    assert_eq!(stats.mallocs, 10);
    assert_eq!(stats.frees, 10);
  }

  #[test]
  fn test_best_fit_picks_smallest_block() {
    let (mut heap, [_, b, _]) = fragmented(SearchMode::Best);

    assert_eq!(heap.allocate(12), Some(b));

    assert_eq!(
      layout(&heap),
      vec![(40, true), (8, false), (16, false), (8, false), (64, true), (8, false)]
    );
    assert_eq!(heap.statistics().splits, 0);
    assert_eq!(heap.statistics().reuses, 1);
  }

  #[test]
  fn test_worst_fit_picks_largest_block() {
    let (mut heap, [_, _, c]) = fragmented(SearchMode::Worst);

    assert_eq!(heap.allocate(12), Some(c));

    assert_eq!(
      layout(&heap),
      vec![
        (40, true),
        (8, false),
        (16, true),
        (8, false),
        (12, false),
        (64 - 12 - HEADER_SIZE, true),
        (8, false),
      ]
    );
    assert_eq!(heap.statistics().splits, 1);
  }

  #[test]
  fn test_first_fit_picks_lowest_block() {
    let (mut heap, [a, _, _]) = fragmented(SearchMode::First);

    assert_eq!(heap.allocate(12), Some(a));
    assert_eq!(layout(&heap)[0], (12, false));
  }

  #[test]
  fn test_next_fit_resumes_after_last_hit() {
    let (mut heap, [a, b, c]) = fragmented(SearchMode::Next);

    assert_eq!(heap.allocate(16), Some(a));
    assert_eq!(heap.allocate(16), Some(b));

    heap.release(Some(a));

    // First fit would go back to `a`; next fit keeps moving forward.
    assert_eq!(heap.allocate(16), Some(c));
  }

  #[test]
  fn test_first_fit_returns_to_released_head() {
    let (mut heap, [a, b, _]) = fragmented(SearchMode::First);

    assert_eq!(heap.allocate(16), Some(a));
    assert_eq!(heap.allocate(16), Some(b));

    heap.release(Some(a));

    assert_eq!(heap.allocate(16), Some(a));
  }

  #[test]
  fn test_split_at_exact_threshold() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.allocate(12 + HEADER_SIZE + 4).unwrap();
    heap.allocate(8).unwrap();
    heap.release(Some(ptr));

    assert_eq!(heap.allocate(12), Some(ptr));
    assert_eq!(layout(&heap), vec![(12, false), (4, true), (8, false)]);
    assert_eq!(heap.statistics().splits, 1);
  }

  #[test]
  fn test_no_split_below_threshold() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.allocate(12 + HEADER_SIZE).unwrap();
    heap.allocate(8).unwrap();
    heap.release(Some(ptr));

    assert_eq!(heap.allocate(12), Some(ptr));
    assert_eq!(layout(&heap), vec![(12 + HEADER_SIZE, false), (8, false)]);

    let stats = heap.statistics();
    assert_eq!(stats.splits, 0);
    assert_eq!(stats.reuses, 1);
  }

  #[test]
  fn test_split_remainder_is_reusable() {
    let mut heap = heap(SearchMode::First);

    let big = heap.allocate(128).unwrap();
    heap.allocate(8).unwrap();
    heap.release(Some(big));

    let small = heap.allocate(16).unwrap();
    let rest = heap.allocate(128 - 16 - HEADER_SIZE).unwrap();

    assert_eq!(small, big);
    assert_eq!(rest.as_ptr() as usize, big.as_ptr() as usize + 16 + HEADER_SIZE);
    assert_eq!(heap.statistics().grows, 2);
  }

  #[test]
  fn test_neighbours_coalesce_on_release() {
    let mut heap = heap(SearchMode::First);

    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(8).unwrap();
    heap.allocate(8).unwrap();

    heap.release(Some(a));
    heap.release(Some(b));

    assert_eq!(layout(&heap), vec![(8 + 8 + HEADER_SIZE, true), (8, false)]);
    assert_eq!(heap.statistics().coalesces, 1);
  }

  #[test_log::test]
  fn test_free_runs_collapse_over_passes() {
    let mut heap = heap(SearchMode::First);

    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(12).unwrap();
    let c = heap.allocate(16).unwrap();
    heap.allocate(8).unwrap();
    let e = heap.allocate(8).unwrap();

    heap.release(Some(a));
    heap.release(Some(c));
    heap.release(Some(b));

    // One merge per position: `a` swallowed `b`, `c` is still separate.
    assert_eq!(
      layout(&heap),
      vec![(8 + 12 + HEADER_SIZE, true), (16, true), (8, false), (8, false)]
    );

    heap.release(Some(e));

    assert_eq!(
      layout(&heap),
      vec![(8 + 12 + 16 + 2 * HEADER_SIZE, true), (8, false), (8, true)]
    );
    assert_eq!(heap.statistics().coalesces, 2);
    assert_eq!(heap.statistics().blocks, 3);
  }

  #[test]
  #[should_panic(expected = "double free")]
  fn test_double_free_is_fatal() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.allocate(8);
    heap.allocate(8).unwrap();

    heap.release(ptr);
    heap.release(ptr);
  }

  #[test]
  #[should_panic(expected = "double free")]
  fn test_double_free_after_merge_is_fatal() {
    let mut heap = heap(SearchMode::First);

    let a = heap.allocate(8);
    let b = heap.allocate(8);
    heap.allocate(8).unwrap();

    heap.release(a);
    heap.release(b);
    assert_eq!(heap.statistics().coalesces, 1);

    heap.release(b);
  }

  #[test]
  fn test_blocks_across_a_gap_never_merge() {
    let mut heap = Heap::new(GappedGrower(ArenaGrower::with_capacity(256)), SearchMode::First);

    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(8).unwrap();
    let gap_start = a.as_ptr() as usize + 8;
    assert_eq!(b.as_ptr() as usize, gap_start + GAP + HEADER_SIZE);

    heap.release(Some(a));
    heap.release(Some(b));

    assert_eq!(layout(&heap), vec![(8, true), (8, true)]);
    assert_eq!(heap.statistics().coalesces, 0);

    // Merging would have claimed `8 + HEADER_SIZE + 8` bytes, gap included.
    let wide = heap.allocate(8 + HEADER_SIZE + 8).unwrap();
    assert_ne!(wide, a);
    assert_eq!(heap.statistics().grows, 3);

    let gap = unsafe { slice::from_raw_parts(gap_start as *const u8, GAP) };
    assert!(gap.iter().all(|&byte| byte == GAP_FILL));
  }

  #[test]
  #[should_panic(expected = "was not allocated by this heap")]
  fn test_foreign_pointer_is_fatal() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.allocate(16).unwrap();
    let inside = unsafe { ptr.add(4) };

    heap.release(Some(inside));
  }

  #[test]
  fn test_growth_failure_returns_none() {
    let mut heap = Heap::new(ArenaGrower::with_capacity(64), SearchMode::First);

    assert!(heap.allocate(64).is_none());

    let stats = heap.statistics();
    assert_eq!(stats.grows, 0);
    assert_eq!(stats.mallocs, 0);
    assert_eq!(stats.max_heap, 0);

    assert!(heap.allocate(8).is_some());
  }

  #[test]
  fn test_oversized_request_fails() {
    let mut heap = heap(SearchMode::First);

    assert!(heap.allocate(usize::MAX).is_none());
    assert!(heap.allocate(usize::MAX - HEADER_SIZE).is_none());
    assert_eq!(heap.statistics().grows, 0);
  }

  #[test]
  fn test_allocate_zeroed_multiplies_count() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.allocate_zeroed(4, 8).unwrap();

    assert_eq!(heap.usable_size(Some(ptr)), 32);
    assert!(bytes(ptr, 32).iter().all(|&b| b == 0));
  }

  #[test]
  fn test_allocate_zeroed_clears_reused_block() {
    let mut heap = heap(SearchMode::First);

    let dirty = heap.allocate(32).unwrap();
    fill(dirty, 32, 0xAB);
    heap.allocate(8).unwrap();
    heap.release(Some(dirty));

    let ptr = heap.allocate_zeroed(4, 8).unwrap();

    assert_eq!(ptr, dirty);
    assert!(bytes(ptr, 32).iter().all(|&b| b == 0));
    assert_eq!(heap.statistics().requested, 32 + 8 + 32);
  }

  #[test]
  fn test_allocate_zeroed_overflow() {
    let mut heap = heap(SearchMode::First);

    assert!(heap.allocate_zeroed(usize::MAX, 2).is_none());
    assert!(heap.allocate_zeroed(0, 8).is_none());
    assert_eq!(heap.statistics().grows, 0);
  }

  #[test]
  fn test_reallocate_none_allocates() {
    let mut heap = heap(SearchMode::First);

    let ptr = heap.reallocate(None, 20).unwrap();

    assert_eq!(heap.usable_size(Some(ptr)), 20);
    assert_eq!(heap.statistics().mallocs, 1);
  }

  #[test]
  fn test_reallocate_grow_copies_old_payload() {
    let mut heap = heap(SearchMode::First);

    let old = heap.allocate(8).unwrap();
    unsafe { ptr::copy_nonoverlapping([1u8, 2, 3, 4, 5, 6, 7, 8].as_ptr(), old.as_ptr(), 8) };

    let new = heap.reallocate(Some(old), 64).unwrap();

    assert_ne!(new, old);
    assert_eq!(bytes(new, 8), &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(layout(&heap), vec![(8, true), (64, false)]);
  }

  #[test]
  fn test_reallocate_shrink_copies_new_size() {
    let mut heap = heap(SearchMode::First);

    let old = heap.allocate(32).unwrap();
    fill(old, 32, 0x5A);

    let new = heap.reallocate(Some(old), 8).unwrap();

    assert_eq!(bytes(new, 8), &[0x5A; 8]);
    assert_eq!(layout(&heap), vec![(32, true), (8, false)]);
  }

  #[test]
  fn test_reallocate_failure_keeps_old_block() {
    let mut heap = Heap::new(ArenaGrower::with_capacity(128), SearchMode::First);

    let old = heap.allocate(8).unwrap();
    fill(old, 8, 0x77);

    assert!(heap.reallocate(Some(old), 4096).is_none());

    assert_eq!(layout(&heap), vec![(8, false)]);
    assert_eq!(bytes(old, 8), &[0x77; 8]);
  }

  #[test]
  fn test_reallocate_to_zero_releases() {
    let mut heap = heap(SearchMode::First);

    let old = heap.allocate(8).unwrap();

    assert!(heap.reallocate(Some(old), 0).is_none());
    assert_eq!(layout(&heap), vec![(8, true)]);
  }

  #[test]
  #[should_panic(expected = "double free")]
  fn test_reallocate_released_block_is_fatal() {
    let mut heap = heap(SearchMode::First);

    let old = heap.allocate(8);
    heap.allocate(8).unwrap();
    heap.release(old);

    heap.reallocate(old, 16);
  }

  #[test]
  fn test_statistics_count_blocks() {
    let mut heap = heap(SearchMode::First);

    let a = heap.allocate(64).unwrap();
    heap.allocate(8).unwrap();
    heap.release(Some(a));
    heap.allocate(8).unwrap();

    let stats = heap.statistics();
    assert_eq!(stats.blocks, 3);
    assert_eq!(stats.mallocs, 3);
    assert_eq!(stats.frees, 1);
    assert_eq!(stats.reuses, 1);
    assert_eq!(stats.grows, 2);
    assert_eq!(stats.splits, 1);
    assert_eq!(stats.requested, 64 + 8 + 8);
    assert_eq!(stats.max_heap, 64 + 8);
  }

  #[test]
  fn test_usable_size_of_none() {
    let heap = heap(SearchMode::First);

    assert_eq!(heap.usable_size(None), 0);
  }

  #[test]
  fn test_search_mode_is_fixed_at_construction() {
    for mode in SearchMode::ALL {
      assert_eq!(heap(mode).search_mode(), mode);
    }
  }
}
