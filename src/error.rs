use std::{error, fmt};

/// Invariant violations detected while releasing memory.
///
/// These are never handed back as recoverable errors: by the time one is
/// noticed the caller has already broken the allocation contract, so the
/// heap reports it and stops (see [`FaultPolicy`](crate::FaultPolicy)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  /// The block behind this address is already free.
  DoubleFree { addr: usize },
  /// This address was never returned by the heap.
  ForeignPointer { addr: usize },
}

impl fmt::Display for Fault {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Self::DoubleFree { addr } => write!(f, "double free of block at {addr:#x}"),
      Self::ForeignPointer { addr } => {
        write!(f, "pointer {addr:#x} was not allocated by this heap")
      }
    }
  }
}

impl error::Error for Fault {}

/// Returned when a fit strategy name is not one of `first`, `best`, `worst`, `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSearchModeError {
  pub(crate) input: String,
}

impl fmt::Display for ParseSearchModeError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "unknown fit strategy `{}` (expected first, best, worst or next)",
      self.input
    )
  }
}

impl error::Error for ParseSearchModeError {}
