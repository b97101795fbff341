use std::ffi::CStr;

use log::warn;

use crate::search::SearchMode;

/// Environment variable selecting the fit strategy of the process-wide heap.
pub const FIT_ENV: &CStr = c"RALLOC_FIT";

/// What the heap does once it detects a broken allocation contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaultPolicy {
  /// Panic with the diagnostic. Suits library use and tests.
  #[default]
  Panic,
  /// Write the diagnostic to stderr and abort the process without unwinding.
  Abort,
}

/// Construction-time settings of a [`Heap`](crate::Heap).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
  pub search: SearchMode,
  pub on_fault: FaultPolicy,
}

impl Config {
  pub fn new(search: SearchMode) -> Self {
    Self {
      search,
      ..Self::default()
    }
  }

  pub fn on_fault(
    mut self,
    policy: FaultPolicy,
  ) -> Self {
    self.on_fault = policy;
    self
  }

  /// Reads [`FIT_ENV`] without allocating, so it is safe to call while the
  /// process allocator itself is being initialised.
  pub fn from_env() -> Self {
    let value = unsafe { libc::getenv(FIT_ENV.as_ptr()) };

    if value.is_null() {
      return Self::from_value(None);
    }

    // SAFETY: getenv returns a NUL-terminated string owned by the environment.
    let value = unsafe { CStr::from_ptr(value) };
    Self::from_value(Some(value.to_bytes()))
  }

  fn from_value(value: Option<&[u8]>) -> Self {
    let Some(name) = value else {
      return Self::default();
    };

    match SearchMode::from_bytes(name) {
      Some(search) => Self::new(search),
      None => {
        warn!(
          "ignoring {}={}, falling back to {} fit",
          FIT_ENV.to_string_lossy(),
          name.escape_ascii(),
          SearchMode::default()
        );
        Self::default()
      }
    }
  }
}
