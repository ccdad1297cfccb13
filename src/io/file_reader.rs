use super::RangeReader;
use crate::types::ByteRange;
use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use std::{
	fs::File,
	io::{Read, Seek, SeekFrom},
	path::Path,
};

/// Range reader over a local file.
///
/// Each read clones the file handle and positions its own cursor, so no lock
/// is held across reads and concurrent lookups never interleave seeks.
#[derive(Debug)]
pub struct FileReader {
	name: String,
	file: File,
}

impl FileReader {
	pub fn open(path: &Path) -> Result<FileReader> {
		ensure!(path.exists(), "file {path:?} does not exist");
		ensure!(path.is_file(), "path {path:?} must be a file");

		let file = File::open(path).with_context(|| format!("opening file {path:?}"))?;

		Ok(FileReader {
			name: path.to_string_lossy().to_string(),
			file,
		})
	}
}

#[async_trait]
impl RangeReader for FileReader {
	async fn read_range(&self, range: &ByteRange) -> Result<Vec<u8>> {
		range.validate()?;

		let mut file = self
			.file
			.try_clone()
			.with_context(|| format!("cloning handle of file '{}'", self.name))?;
		file
			.seek(SeekFrom::Start(range.offset))
			.with_context(|| format!("seeking to offset {} in file '{}'", range.offset, self.name))?;

		// Reads up to `length` bytes; a file ending early is not an error.
		let mut buffer = Vec::with_capacity(range.length as usize);
		file
			.take(range.length)
			.read_to_end(&mut buffer)
			.with_context(|| {
				format!(
					"reading {} bytes at offset {} in file '{}'",
					range.length, range.offset, self.name
				)
			})?;

		Ok(buffer)
	}

	fn name(&self) -> &str {
		&self.name
	}
}
