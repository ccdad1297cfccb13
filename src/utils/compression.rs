use crate::types::Compression;
use anyhow::{bail, Context, Result};
use flate2::bufread::GzDecoder;
use std::{io::Read, sync::Arc};

/// Decompression dispatch, replaceable per source to install additional
/// codecs (e.g. brotli or zstd).
pub type DecompressFn = Arc<dyn Fn(Vec<u8>, Compression) -> Result<Vec<u8>> + Send + Sync>;

/// Decompresses a payload according to its compression tag.
///
/// `None` and `Unknown` pass the data through unchanged. Brotli and Zstd are
/// recognized by the format but not decoded here; installing them is the job
/// of a custom [`DecompressFn`].
pub fn decompress(data: Vec<u8>, compression: Compression) -> Result<Vec<u8>> {
	match compression {
		Compression::None | Compression::Unknown => Ok(data),
		Compression::Gzip => decompress_gzip(&data),
		unsupported => bail!("unsupported compression: {unsupported}"),
	}
}

/// Decompresses a gzip stream into a new buffer.
pub fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
	let mut result: Vec<u8> = Vec::new();
	GzDecoder::new(data)
		.read_to_end(&mut result)
		.context("decompressing gzip stream")?;
	Ok(result)
}

/// The default [`DecompressFn`].
pub fn default_decompress() -> DecompressFn {
	Arc::new(decompress)
}
