/// Granularity of every payload handed out by the allocator.
pub const WORD: usize = 4;

/// Rounds `value` up to the next multiple of [`WORD`].
///
/// Returns `None` when the rounded value does not fit in a `usize`, which the
/// allocator reports as an allocation failure.
///
/// # Examples
///
/// ```rust
/// use rallocator::align::align4;
///
/// assert_eq!(align4(0), Some(0));
/// assert_eq!(align4(13), Some(16));
/// assert_eq!(align4(usize::MAX), None);
/// ```
pub const fn align4(value: usize) -> Option<usize> {
  match value.checked_add(WORD - 1) {
    Some(padded) => Some(padded & !(WORD - 1)),
    None => None,
  }
}
