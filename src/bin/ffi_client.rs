//! Minimal C-style program driving the exported `malloc` family.
//!
//! It runs without the Rust runtime (`no_main`) so nothing but the calls
//! below reaches the allocator, and it talks to stdout with raw `write`s.
//!
//! ```text
//!   ffi-client session      malloc/calloc/realloc/free round trip, exit 0
//!   ffi-client double-free  releases the same block twice
//!   ffi-client merged-free  releases a block again after it was coalesced
//! ```

#![no_main]

use std::{
  ffi::{CStr, c_char, c_int},
  slice,
};

use libc::{STDOUT_FILENO, c_void};
use rallocator::ffi::{calloc, free, malloc, malloc_usable_size, realloc};

fn say(msg: &str) {
  unsafe { libc::write(STDOUT_FILENO, msg.as_ptr().cast(), msg.len()) };
}

unsafe fn bytes<'a>(
  ptr: *mut c_void,
  len: usize,
) -> &'a mut [u8] {
  unsafe { slice::from_raw_parts_mut(ptr.cast::<u8>(), len) }
}

unsafe fn session() -> c_int {
  unsafe {
    let text = malloc(13);
    if text.is_null() || malloc_usable_size(text) < 16 {
      return 1;
    }
    bytes(text, 13).copy_from_slice(b"hello, world!");

    let zeroed = calloc(4, 8);
    if zeroed.is_null() || bytes(zeroed, 32).iter().any(|&b| b != 0) {
      return 1;
    }

    let grown = realloc(text, 64);
    if grown.is_null() || bytes(grown, 13) != b"hello, world!" {
      return 1;
    }

    free(std::ptr::null_mut());
    free(zeroed);
    free(grown);
  }

  say("session ok\n");
  0
}

unsafe fn double_free() -> c_int {
  unsafe {
    let ptr = malloc(8);
    malloc(8);
    free(ptr);
    free(ptr);
  }
  0
}

unsafe fn merged_free() -> c_int {
  unsafe {
    let a = malloc(8);
    let b = malloc(8);
    malloc(8);
    free(a);
    free(b);
    free(b);
  }
  0
}

#[unsafe(no_mangle)]
pub extern "C" fn main(
  argc: c_int,
  argv: *const *const c_char,
) -> c_int {
  if argc < 2 {
    say("usage: ffi-client session|double-free|merged-free\n");
    return 2;
  }

  let mode = unsafe { CStr::from_ptr(*argv.add(1)) };

  match mode.to_bytes() {
    b"session" => unsafe { session() },
    b"double-free" => unsafe { double_free() },
    b"merged-free" => unsafe { merged_free() },
    _ => {
      say("unknown mode\n");
      2
    }
  }
}
