use std::fmt;

/// Payload type of the tiles in an archive.
///
/// Purely informational: tiles are resolved and returned without looking at
/// their type. Useful for callers that serve tiles over HTTP.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TileType {
	Unknown = 0x0,
	MVT = 0x1,
	PNG = 0x2,
	JPEG = 0x3,
	WEBP = 0x4,
	AVIF = 0x5,
}

impl TileType {
	/// Maps a header byte to its tile type; out-of-range bytes become
	/// [`TileType::Unknown`].
	pub fn from_u8(value: u8) -> TileType {
		match value {
			0x1 => TileType::MVT,
			0x2 => TileType::PNG,
			0x3 => TileType::JPEG,
			0x4 => TileType::WEBP,
			0x5 => TileType::AVIF,
			_ => TileType::Unknown,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			TileType::Unknown => "unknown",
			TileType::MVT => "mvt",
			TileType::PNG => "png",
			TileType::JPEG => "jpeg",
			TileType::WEBP => "webp",
			TileType::AVIF => "avif",
		}
	}

	/// Value for a `Content-Type` HTTP header when serving tiles.
	pub fn content_type(&self) -> Option<&'static str> {
		match self {
			TileType::Unknown => None,
			TileType::MVT => Some("application/vnd.mapbox-vector-tile"),
			TileType::PNG => Some("image/png"),
			TileType::JPEG => Some("image/jpeg"),
			TileType::WEBP => Some("image/webp"),
			TileType::AVIF => Some("image/avif"),
		}
	}

	/// File extension for the tile payload, including the leading dot.
	pub fn ext(&self) -> String {
		format!(".{}", self.as_str())
	}
}

impl fmt::Display for TileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_u8() {
		assert_eq!(TileType::from_u8(0), TileType::Unknown);
		assert_eq!(TileType::from_u8(1), TileType::MVT);
		assert_eq!(TileType::from_u8(2), TileType::PNG);
		assert_eq!(TileType::from_u8(3), TileType::JPEG);
		assert_eq!(TileType::from_u8(4), TileType::WEBP);
		assert_eq!(TileType::from_u8(5), TileType::AVIF);
		assert_eq!(TileType::from_u8(6), TileType::Unknown);
	}

	#[test]
	fn content_type() {
		assert_eq!(TileType::Unknown.content_type(), None);
		assert_eq!(TileType::MVT.content_type(), Some("application/vnd.mapbox-vector-tile"));
		assert_eq!(TileType::PNG.content_type(), Some("image/png"));
		assert_eq!(TileType::JPEG.content_type(), Some("image/jpeg"));
		assert_eq!(TileType::WEBP.content_type(), Some("image/webp"));
		assert_eq!(TileType::AVIF.content_type(), Some("image/avif"));
	}

	#[test]
	fn ext() {
		assert_eq!(TileType::MVT.ext(), ".mvt");
		assert_eq!(TileType::PNG.ext(), ".png");
	}
}
