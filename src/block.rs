use std::{
  fmt, mem,
  ptr::{self, NonNull},
};

/// Bookkeeping record stored directly in front of every payload.
#[derive(Clone, Copy)]
pub struct Block {
  pub size: usize,
  pub is_free: bool,
  pub next: *mut Block,
}

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
    next: *mut Block,
  ) -> Self {
    Self { size, is_free, next }
  }
}

/// Bytes occupied by a [`Block`] header. Identical for every block.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

// Every header size the allocator can be built with keeps payloads on the
// 4-byte grid.
const _: () = assert!(HEADER_SIZE % crate::align::WORD == 0);

/// Handle to a header living inside managed heap memory.
///
/// Payload sizes are only multiples of 4, so a header carved out of a split may
/// sit on a 4-byte boundary. All header accesses therefore go through
/// unaligned reads and writes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BlockPtr(NonNull<Block>);

impl BlockPtr {
  /// Wraps the header located at `addr`.
  ///
  /// # Safety
  ///
  /// `addr` must point to at least `HEADER_SIZE` writable bytes, followed by
  /// the payload the header describes, and that memory must stay valid for as
  /// long as the handle is used.
  pub unsafe fn at(addr: NonNull<u8>) -> Self {
    Self(addr.cast())
  }

  /// Writes a fresh header at `addr` and returns its handle.
  ///
  /// # Safety
  ///
  /// Same contract as [`BlockPtr::at`].
  pub unsafe fn init(
    addr: NonNull<u8>,
    block: Block,
  ) -> Self {
    let handle = unsafe { Self::at(addr) };
    handle.write(block);
    handle
  }

  fn from_raw(raw: *mut Block) -> Option<Self> {
    NonNull::new(raw).map(Self)
  }

  pub fn as_raw(self) -> *mut Block {
    self.0.as_ptr()
  }

  pub fn addr(self) -> usize {
    self.0.as_ptr() as usize
  }

  pub fn read(self) -> Block {
    // SAFETY: the constructor contract guarantees a readable header.
    unsafe { ptr::read_unaligned(self.0.as_ptr()) }
  }

  pub fn write(
    self,
    block: Block,
  ) {
    // SAFETY: the constructor contract guarantees a writable header.
    unsafe { ptr::write_unaligned(self.0.as_ptr(), block) }
  }

  pub fn size(self) -> usize {
    self.read().size
  }

  pub fn set_size(
    self,
    size: usize,
  ) {
    let mut block = self.read();
    block.size = size;
    self.write(block);
  }

  pub fn is_free(self) -> bool {
    self.read().is_free
  }

  pub fn set_free(
    self,
    is_free: bool,
  ) {
    let mut block = self.read();
    block.is_free = is_free;
    self.write(block);
  }

  pub fn next(self) -> Option<BlockPtr> {
    Self::from_raw(self.read().next)
  }

  pub fn set_next(
    self,
    next: Option<BlockPtr>,
  ) {
    let mut block = self.read();
    block.next = next.map_or(ptr::null_mut(), BlockPtr::as_raw);
    self.write(block);
  }

  /// Address handed to clients: the first byte after the header.
  pub fn payload(self) -> NonNull<u8> {
    // SAFETY: the header is followed by its payload inside the same region,
    // so the offset stays in bounds and cannot wrap to null.
    unsafe { self.0.cast::<u8>().add(HEADER_SIZE) }
  }

  /// First address past this block's payload.
  pub fn end(self) -> usize {
    self.addr() + HEADER_SIZE + self.size()
  }
}

impl fmt::Debug for BlockPtr {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let block = self.read();
    f.debug_struct("Block")
      .field("at", &self.0)
      .field("size", &block.size)
      .field("is_free", &block.is_free)
      .finish()
  }
}
