use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Sequential little-endian reader over an in-memory byte slice.
///
/// Covers exactly what the archive codecs need: fixed-width integers for the
/// header and unsigned LEB128 varints for directories.
pub struct ValueReader<'a> {
	cursor: Cursor<&'a [u8]>,
}

impl<'a> ValueReader<'a> {
	pub fn new(bytes: &'a [u8]) -> Self {
		Self {
			cursor: Cursor::new(bytes),
		}
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(self.cursor.read_u8()?)
	}

	pub fn read_i32(&mut self) -> Result<i32> {
		Ok(self.cursor.read_i32::<LittleEndian>()?)
	}

	pub fn read_u64(&mut self) -> Result<u64> {
		Ok(self.cursor.read_u64::<LittleEndian>()?)
	}

	/// Reads an unsigned LEB128 varint: 7 data bits per byte, high bit set on
	/// every byte but the last.
	pub fn read_varint(&mut self) -> Result<u64> {
		let mut value = 0u64;
		let mut shift = 0;
		loop {
			let byte = self
				.cursor
				.read_u8()
				.context("unexpected end of varint stream")?;
			value |= u64::from(byte & 0x7F) << shift;
			if byte & 0x80 == 0 {
				break;
			}
			shift += 7;
			if shift >= 70 {
				bail!("varint too long");
			}
		}
		Ok(value)
	}
}
