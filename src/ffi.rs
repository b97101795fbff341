//! C allocation entry points backed by a process-wide [`Heap`].
//!
//! Build with `--features c_api` and link the `cdylib` (or `LD_PRELOAD` it) to
//! replace `malloc`, `free`, `calloc` and `realloc` for the whole process. The
//! heap is created on first use with the fit strategy named by `RALLOC_FIT`
//! and prints its statistics when the process exits.
//!
//! Payloads are aligned to 4 bytes only, and the heap is not thread-safe:
//! callers must not enter it from more than one thread or from a signal handler.

use std::{
  cell::{Cell, UnsafeCell},
  ptr::{self, NonNull},
};

use libc::{c_void, size_t};

use crate::{Config, FaultPolicy, Heap, SbrkGrower};

struct GlobalHeap {
  slot: UnsafeCell<Option<Heap<SbrkGrower>>>,
  report_registered: Cell<bool>,
}

// SAFETY: the C entry points are documented as single-threaded.
unsafe impl Sync for GlobalHeap {}

static HEAP: GlobalHeap = GlobalHeap {
  slot: UnsafeCell::new(None),
  report_registered: Cell::new(false),
};

/// Returns the process heap, creating it and registering the exit report on
/// first use.
///
/// `atexit` may itself call `malloc`, which re-enters here. The heap is stored
/// before the hook is registered, and no reference to it is held across the
/// call, so the nested call finds it ready and registers nothing.
///
/// # Safety
///
/// No other reference to the process heap may be alive.
unsafe fn heap() -> &'static mut Heap<SbrkGrower> {
  let slot = HEAP.slot.get();

  // SAFETY: single-threaded, and no reference into the slot is live here.
  if unsafe { (*slot).is_none() } {
    let config = Config::from_env().on_fault(FaultPolicy::Abort);
    unsafe { *slot = Some(Heap::with_config(SbrkGrower::new(), config)) };
  }

  if !HEAP.report_registered.replace(true) {
    unsafe { libc::atexit(print_statistics) };
  }

  // SAFETY: the slot was filled above and is never emptied.
  unsafe { (*slot).as_mut().unwrap_unchecked() }
}

extern "C" fn print_statistics() {
  // SAFETY: exit hooks run after `main` returns, with no allocation in flight.
  if let Some(heap) = unsafe { &*HEAP.slot.get() } {
    heap.statistics().report();
  }
}

fn into_raw(ptr: Option<NonNull<u8>>) -> *mut c_void {
  ptr.map_or(ptr::null_mut(), |ptr| ptr.as_ptr().cast())
}

fn from_raw(ptr: *mut c_void) -> Option<NonNull<u8>> {
  NonNull::new(ptr.cast())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc(size: size_t) -> *mut c_void {
  into_raw(unsafe { heap() }.allocate(size))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
  if ptr.is_null() {
    return;
  }
  unsafe { heap() }.release(from_raw(ptr));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn calloc(
  nmemb: size_t,
  size: size_t,
) -> *mut c_void {
  into_raw(unsafe { heap() }.allocate_zeroed(nmemb, size))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn realloc(
  ptr: *mut c_void,
  size: size_t,
) -> *mut c_void {
  into_raw(unsafe { heap() }.reallocate(from_raw(ptr), size))
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc_usable_size(ptr: *mut c_void) -> size_t {
  unsafe { heap() }.usable_size(from_raw(ptr))
}
