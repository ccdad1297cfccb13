use anyhow::{ensure, Result};
use std::{fmt, ops::Range};

/// A contiguous range of bytes within an archive, as an offset and a length.
///
/// Directory entries store ranges relative to their section; [`shifted_forward`](Self::shifted_forward)
/// turns them into absolute archive positions.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct ByteRange {
	/// The starting offset of the byte range.
	pub offset: u64,
	/// The length of the byte range.
	pub length: u64,
}

impl ByteRange {
	pub fn new(offset: u64, length: u64) -> Self {
		Self { offset, length }
	}

	/// Checks that the range describes a readable region.
	///
	/// Zero-length reads are never meaningful against an archive, so they are
	/// rejected before any I/O happens.
	pub fn validate(&self) -> Result<()> {
		ensure!(self.length > 0, "invalid range: length must be positive");
		Ok(())
	}

	/// Returns this range shifted forward by `offset` bytes.
	pub fn shifted_forward(&self, offset: u64) -> Self {
		Self {
			offset: self.offset + offset,
			length: self.length,
		}
	}

	/// Converts the range to the half-open `Range<usize>` form used by bounded
	/// object-store requests: the last byte on the wire is `end - 1`.
	pub fn as_range_usize(&self) -> Range<usize> {
		self.offset as usize..(self.offset + self.length) as usize
	}
}

impl fmt::Debug for ByteRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ByteRange[{},{}]", self.offset, self.length)
	}
}
