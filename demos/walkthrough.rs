use std::{env, io, process, ptr::NonNull};

use rallocator::{Heap, SbrkGrower, SearchMode};

/// Holds the walkthrough on a step so the process can be inspected from
/// another terminal, e.g. `pmap <pid>` or `cat /proc/<pid>/maps`.
fn pause() {
  println!("\n--- hit ENTER for the next step ---");
  let mut line = String::new();
  let _ = io::stdin().read_line(&mut line);
}

fn show_break(stage: &str) {
  let pid = process::id();
  println!("{stage:>20}: pid {pid}, break at {:?}", SbrkGrower::program_break());
}

fn print_blocks(heap: &Heap<SbrkGrower>) {
  for block in heap.blocks() {
    println!(
      "    {:?}  {:>6} bytes  {}",
      block.payload,
      block.size,
      if block.is_free { "free" } else { "in use" }
    );
  }
}

fn print_alloc(
  heap: &Heap<SbrkGrower>,
  size: usize,
  ptr: Option<NonNull<u8>>,
) {
  println!(
    "Requested {} bytes, got {} bytes at {:?}, program break = {:?}",
    size,
    heap.usable_size(ptr),
    ptr,
    SbrkGrower::program_break()
  );
}

fn main() {
  // The fit strategy can be picked on the command line: first, best, worst, next.
  let mode = env::args()
    .nth(1)
    .map(|arg| arg.parse::<SearchMode>())
    .transpose()
    .unwrap_or_else(|err| {
      eprintln!("{err}");
      process::exit(2);
    })
    .unwrap_or_default();

  let mut heap = Heap::new(SbrkGrower::new(), mode);
  println!("Using {mode} fit");

  show_break("start");
  pause();

  // --------------------------------------------------------------------
  // 1) Three allocations grow the heap one block at a time.
  // --------------------------------------------------------------------
  let first = heap.allocate(64);
  println!("\n[1] Allocate 64 bytes");
  print_alloc(&heap, 64, first);

  let second = heap.allocate(13);
  println!("[1] Allocate 13 bytes (rounded up to a multiple of 4)");
  print_alloc(&heap, 13, second);

  let third = heap.allocate(32);
  println!("[1] Allocate 32 bytes");
  print_alloc(&heap, 32, third);

  print_blocks(&heap);
  pause();

  // --------------------------------------------------------------------
  // 2) Release the first block and ask for something smaller.
  //    The free block is reused and split; the break does not move.
  // --------------------------------------------------------------------
  heap.release(first);
  println!("\n[2] Released first block");

  let small = heap.allocate(8);
  println!(
    "[2] Allocate 8 bytes: {}",
    if small == first {
      "reused the freed block"
    } else {
      "allocated somewhere else"
    }
  );
  print_alloc(&heap, 8, small);
  print_blocks(&heap);
  pause();

  // --------------------------------------------------------------------
  // 3) Release neighbours and watch them coalesce.
  // --------------------------------------------------------------------
  heap.release(small);
  heap.release(second);
  println!("\n[3] Released the small and the 13-byte block");
  print_blocks(&heap);
  pause();

  // --------------------------------------------------------------------
  // 4) Move an allocation into a larger block; the contents are copied.
  // --------------------------------------------------------------------
  let moved = heap.reallocate(third, 256);
  println!("\n[4] Reallocate 32 -> 256 bytes");
  print_alloc(&heap, 256, moved);
  print_blocks(&heap);
  pause();

  // --------------------------------------------------------------------
  // 5) Allocate a large zeroed block to observe heap growth.
  // --------------------------------------------------------------------
  show_break("before large alloc");

  let big = heap.allocate_zeroed(16, 4096);
  println!("\n[5] Allocate 64 KiB of zeroed memory");
  print_alloc(&heap, 16 * 4096, big);

  show_break("after large alloc");

  // --------------------------------------------------------------------
  // 6) End of demo. The heap never shrinks; the OS reclaims everything
  //    when the process exits.
  // --------------------------------------------------------------------
  heap.statistics().report();
}
