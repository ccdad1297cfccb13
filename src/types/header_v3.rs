use super::{ByteRange, Compression, TileType};
use crate::io::ValueReader;
use anyhow::{bail, ensure, Result};

/// Size of the fixed archive header in bytes.
pub const HEADER_LENGTH: u64 = 127;

/// The fixed 127-byte header at the start of every archive.
///
/// All multi-byte integers are little-endian. Longitude/latitude bounds are
/// stored as degrees scaled by 10^7 ("E7") in signed 32-bit integers.
///
/// The `etag` is not part of the wire format: it identifies the archive
/// version and namespaces every directory cache key, so directories cached
/// for one archive are never served for another. When the backend supplies
/// no etag, a unique one is synthesized at open time.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderV3 {
	pub etag: String,
	pub spec_version: u8,
	pub root_dir: ByteRange,
	pub metadata: ByteRange,
	pub leaf_dirs: ByteRange,
	pub tile_data: ByteRange,
	pub addressed_tiles_count: u64,
	pub tile_entries_count: u64,
	pub tile_contents_count: u64,
	pub clustered: bool,
	pub internal_compression: Compression,
	pub tile_compression: Compression,
	pub tile_type: TileType,
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub min_lon_e7: i32,
	pub min_lat_e7: i32,
	pub max_lon_e7: i32,
	pub max_lat_e7: i32,
	pub center_zoom: u8,
	pub center_lon_e7: i32,
	pub center_lat_e7: i32,
}

impl HeaderV3 {
	/// Parses the header from the first [`HEADER_LENGTH`] bytes of an archive.
	///
	/// # Errors
	/// Fails on short input, a missing `"PMTiles"` magic, the unsupported spec
	/// versions 1 and 2, and unknown version bytes. No other field is
	/// validated here; ranges and enum tags are checked when they are used.
	pub fn deserialize(buffer: &[u8]) -> Result<HeaderV3> {
		ensure!(
			buffer.len() >= HEADER_LENGTH as usize,
			"incomplete header: got {} of {HEADER_LENGTH} bytes",
			buffer.len()
		);
		ensure!(
			&buffer[0..7] == b"PMTiles",
			"magic number not detected, this is not a PMTiles archive"
		);

		let spec_version = buffer[7];
		match spec_version {
			3 => {}
			1 | 2 => bail!("spec version {spec_version} is unsupported"),
			_ => bail!("unknown spec version {spec_version}"),
		}

		let mut reader = ValueReader::new(&buffer[8..HEADER_LENGTH as usize]);

		Ok(HeaderV3 {
			etag: String::new(),
			spec_version,
			root_dir: ByteRange::new(reader.read_u64()?, reader.read_u64()?),
			metadata: ByteRange::new(reader.read_u64()?, reader.read_u64()?),
			leaf_dirs: ByteRange::new(reader.read_u64()?, reader.read_u64()?),
			tile_data: ByteRange::new(reader.read_u64()?, reader.read_u64()?),
			addressed_tiles_count: reader.read_u64()?,
			tile_entries_count: reader.read_u64()?,
			tile_contents_count: reader.read_u64()?,
			clustered: reader.read_u8()? == 0x1,
			internal_compression: Compression::from_u8(reader.read_u8()?),
			tile_compression: Compression::from_u8(reader.read_u8()?),
			tile_type: TileType::from_u8(reader.read_u8()?),
			min_zoom: reader.read_u8()?,
			max_zoom: reader.read_u8()?,
			min_lon_e7: reader.read_i32()?,
			min_lat_e7: reader.read_i32()?,
			max_lon_e7: reader.read_i32()?,
			max_lat_e7: reader.read_i32()?,
			center_zoom: reader.read_u8()?,
			center_lon_e7: reader.read_i32()?,
			center_lat_e7: reader.read_i32()?,
		})
	}
}
