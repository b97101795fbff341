//! # rallocator - A Free-List Memory Allocator Library
//!
//! This crate implements `malloc`, `free`, `calloc` and `realloc` on top of a
//! heap it manages itself, growing the program's data segment with `sbrk`
//! whenever no free block can serve a request.
//!
//! ## Overview
//!
//! Every region of the managed heap, free or in use, is a **block**: a fixed
//! size header followed by the client's payload. Blocks are chained in a
//! singly linked list ordered by address:
//!
//! ```text
//!   Block List:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌───┬──────┬───┬──────┬───┬────────────┬───┬──────┐                │
//!   │   │ H │ used │ H │ free │ H │    used    │ H │ free │                │
//!   │   └───┴──────┴───┴──────┴───┴────────────┴───┴──────┘                │
//!   │     │          ▲ │        ▲ │              ▲                    ▲    │
//!   │     └──────────┘ └────────┘ └──────────────┘                    │    │
//!   │          next        next        next                       Program  │
//!   │                                                              Break   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An allocation runs the configured fit strategy over the list. A hit that
//! is comfortably larger than needed is **split**, leaving a free remainder
//! behind it. A miss **grows** the heap by exactly one header plus the
//! payload. A release marks the block free and **coalesces** touching
//! free blocks in one pass over the list.
//!
//! ## Crate Structure
//!
//! ```text
//!   rallocator
//!   ├── align      - Word rounding (align4)
//!   ├── block      - Block header and typed header handle (internal)
//!   ├── list       - Address-ordered block list (internal)
//!   ├── search     - Fit strategies: first, best, worst, next
//!   ├── grow       - Heap growers: sbrk, fixed arena
//!   ├── heap       - Heap, the allocator context
//!   ├── stats      - Lifetime counters and exit report
//!   ├── config     - Construction-time settings
//!   ├── error      - Fault and parse errors
//!   └── ffi        - C entry points (feature `c_api`)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rallocator::{ArenaGrower, Heap, SearchMode};
//!
//! let mut heap = Heap::new(ArenaGrower::with_capacity(4096), SearchMode::Best);
//!
//! let ptr = heap.allocate(13).expect("arena has room");
//! unsafe { ptr.as_ptr().write_bytes(0xAB, 16) };
//!
//! heap.release(Some(ptr));
//! assert_eq!(heap.statistics().frees, 1);
//! ```
//!
//! ## Block Layout
//!
//! ```text
//!   Single Allocation:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ is_free: false  │  │  │                          │  │
//!   │  │ next: null/ptr  │  │  │  N bytes, N % 4 == 0     │  │
//!   │  └─────────────────┘  │  │                          │  │
//!   │     HEADER_SIZE       │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **Grow-only**: Memory is never returned to the OS
//! - **4-byte alignment**: Payloads are only guaranteed to sit on a 4-byte grid
//! - **Unix-only**: Requires `libc` and `sbrk` (POSIX systems)

pub mod align;
mod block;
mod config;
mod error;
// The unit-test binary must keep the system `malloc`.
#[cfg(all(feature = "c_api", not(test)))]
pub mod ffi;
mod grow;
mod heap;
mod list;
mod search;
mod stats;

pub use block::HEADER_SIZE;
pub use config::{Config, FIT_ENV, FaultPolicy};
pub use error::{Fault, ParseSearchModeError};
pub use grow::{ArenaGrower, Grower, SbrkGrower};
pub use heap::{BlockInfo, Heap};
pub use search::SearchMode;
pub use stats::Stats;
