use std::fmt;

/// Compression tag of a directory, metadata or tile payload.
///
/// Brotli and Zstd are reserved by the format but not decoded by this crate;
/// they can be installed through a custom decompression table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Compression {
	Unknown = 0x0,
	None = 0x1,
	Gzip = 0x2,
	Brotli = 0x3,
	Zstd = 0x4,
}

impl Compression {
	/// Maps a header byte to its compression tag.
	///
	/// The header codec validates nothing beyond magic and version, so
	/// out-of-range bytes become [`Compression::Unknown`] and are rejected only
	/// when a payload is actually decompressed.
	pub fn from_u8(value: u8) -> Compression {
		match value {
			0x1 => Compression::None,
			0x2 => Compression::Gzip,
			0x3 => Compression::Brotli,
			0x4 => Compression::Zstd,
			_ => Compression::Unknown,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Compression::Unknown => "unknown",
			Compression::None => "none",
			Compression::Gzip => "gzip",
			Compression::Brotli => "brotli",
			Compression::Zstd => "zstd",
		}
	}

	/// Value for a `Content-Encoding` HTTP header when serving tiles as-is.
	pub fn content_encoding(&self) -> Option<&'static str> {
		match self {
			Compression::Gzip => Some("gzip"),
			Compression::Brotli => Some("br"),
			Compression::Zstd => Some("zstd"),
			_ => None,
		}
	}
}

impl fmt::Display for Compression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
