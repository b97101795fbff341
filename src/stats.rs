use std::fmt::{self, Write};

use libc::{STDOUT_FILENO, c_int, c_void};

/// Lifetime counters of a heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
  /// Allocations granted.
  pub mallocs: usize,
  /// Blocks released.
  pub frees: usize,
  /// Allocations served from an existing free block.
  pub reuses: usize,
  /// Times the heap was extended.
  pub grows: usize,
  pub splits: usize,
  pub coalesces: usize,
  /// Entries in the block list. Filled in by [`Heap::statistics`](crate::Heap::statistics).
  pub blocks: usize,
  /// Raw bytes asked for, before alignment.
  pub requested: usize,
  /// Payload bytes the heap was extended by.
  pub max_heap: usize,
}

impl fmt::Display for Stats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "\nheap management statistics")?;
    writeln!(f, "mallocs:\t{}", self.mallocs)?;
    writeln!(f, "frees:\t\t{}", self.frees)?;
    writeln!(f, "reuses:\t\t{}", self.reuses)?;
    writeln!(f, "grows:\t\t{}", self.grows)?;
    writeln!(f, "splits:\t\t{}", self.splits)?;
    writeln!(f, "coalesces:\t{}", self.coalesces)?;
    writeln!(f, "blocks:\t\t{}", self.blocks)?;
    writeln!(f, "requested:\t{}", self.requested)?;
    writeln!(f, "max heap:\t{}", self.max_heap)
  }
}

impl Stats {
  /// Prints the report on standard output.
  ///
  /// Formatting happens in a stack buffer and goes straight to `write(2)`, so
  /// this can run from an exit hook of the allocator that serves `std` itself.
  pub fn report(&self) {
    write_fd(STDOUT_FILENO, format_args!("{self}"));
  }
}

/// Fixed-size formatting target. Output past the capacity is dropped.
struct StackWriter<const N: usize> {
  buf: [u8; N],
  len: usize,
}

impl<const N: usize> StackWriter<N> {
  const fn new() -> Self {
    Self { buf: [0; N], len: 0 }
  }

  fn as_bytes(&self) -> &[u8] {
    &self.buf[..self.len]
  }
}

impl<const N: usize> Write for StackWriter<N> {
  fn write_str(
    &mut self,
    s: &str,
  ) -> fmt::Result {
    let room = N - self.len;
    let take = s.len().min(room);
    self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
    self.len += take;

    if take < s.len() { Err(fmt::Error) } else { Ok(()) }
  }
}

/// Formats `args` without touching the heap and writes them to `fd`.
pub(crate) fn write_fd(
  fd: c_int,
  args: fmt::Arguments<'_>,
) {
  let mut out = StackWriter::<512>::new();
  // A truncated message is still worth emitting.
  let _ = out.write_fmt(args);

  let mut pending = out.as_bytes();
  while !pending.is_empty() {
    let written = unsafe { libc::write(fd, pending.as_ptr().cast::<c_void>(), pending.len()) };
    if written <= 0 {
      break;
    }
    pending = &pending[written as usize..];
  }
}
