use std::ptr::{self, NonNull};

use libc::{c_void, intptr_t, sbrk};
use log::{debug, warn};

/// Source of fresh heap memory.
///
/// # Safety
///
/// Implementors must hand out memory that is writable, not aliased by anything
/// else, and valid for as long as the grower lives. Successive grows must
/// return strictly increasing, non-overlapping ranges so the block list stays
/// in address order.
///
/// Ranges need not be contiguous: a new range may start past the end of the
/// previous one when something else claimed the memory in between. The heap
/// only merges blocks that touch, so such a gap is never handed out.
pub unsafe trait Grower {
  /// Extends the managed region by exactly `bytes` bytes and returns the start
  /// of the new range, or `None` when the request is denied.
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>>;
}

/// Extends the process data segment with `sbrk(2)`.
///
/// Memory is never given back: the break only moves up. Other `brk` users in
/// the process may move it too, leaving holes between two grows.
#[derive(Debug, Default)]
pub struct SbrkGrower {
  end: Option<usize>,
}

impl SbrkGrower {
  pub const fn new() -> Self {
    Self { end: None }
  }

  /// Current program break.
  pub fn program_break() -> *mut u8 {
    unsafe { sbrk(0) }.cast()
  }
}

unsafe impl Grower for SbrkGrower {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>> {
    let increment = intptr_t::try_from(bytes).ok()?;

    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      warn!("sbrk({bytes}) refused by the kernel");
      return None;
    }

    let start = address as usize;
    if self.end.is_some_and(|end| end != start) {
      debug!("program break moved by someone else; new range starts at {start:#x}");
    }
    self.end = Some(start + bytes);

    NonNull::new(address.cast())
  }
}

/// Fixed-capacity region carved from a single up-front allocation.
///
/// Handy when several independent heaps must live in one process, e.g. tests.
/// Running out of capacity behaves like the OS refusing to grow.
pub struct ArenaGrower {
  base: NonNull<u64>,
  words: usize,
  used: usize,
}

impl ArenaGrower {
  pub fn with_capacity(bytes: usize) -> Self {
    let words = bytes.div_ceil(size_of::<u64>());
    let storage = vec![0u64; words].into_boxed_slice();
    let base = NonNull::new(Box::into_raw(storage).cast::<u64>()).unwrap_or(NonNull::dangling());

    Self { base, words, used: 0 }
  }

  pub fn capacity(&self) -> usize {
    self.words * size_of::<u64>()
  }

  /// Bytes handed out so far.
  pub fn used(&self) -> usize {
    self.used
  }
}

unsafe impl Grower for ArenaGrower {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Option<NonNull<u8>> {
    let end = self.used.checked_add(bytes)?;

    if end > self.capacity() {
      warn!(
        "arena exhausted: {} of {} bytes used, {bytes} more requested",
        self.used,
        self.capacity()
      );
      return None;
    }

    // SAFETY: `used <= capacity`, so the offset stays inside the storage.
    let start = unsafe { self.base.cast::<u8>().add(self.used) };
    self.used = end;

    Some(start)
  }
}

impl Drop for ArenaGrower {
  fn drop(&mut self) {
    // SAFETY: `base` and `words` come from the boxed slice leaked in
    // `with_capacity`.
    unsafe {
      drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
        self.base.as_ptr(),
        self.words,
      )));
    }
  }
}
