//! Hilbert-curve tile ids.
//!
//! A tile id enumerates all tiles of all zoom levels: the `(4^z - 1) / 3` tiles
//! of zooms below `z` come first, followed by the tiles of zoom `z` in
//! Hilbert-curve order. Two codecs implement the same mapping: an iterative
//! reference version and a branchless variant driven by 4-bit lookup tables.

use anyhow::{ensure, Result};

/// Maximum zoom accepted by the reference codec.
pub const MAX_ZOOM: u8 = 26;

/// Smallest id whose zoom no longer fits the 64-bit id space.
const INVALID_TILE_ID: u64 = 0x5555_5555_5555_5555;

// Encoder tables: 3-bit rows of [state, x bit, y bit] map to an output bit
// pair (LUT1) and the next curve state (LUT2).
const LUT1: u64 = 0x361E_9CB4;
const LUT2: u64 = 0x8FE6_5831;

// Decoder tables: rows of [state, code bit pair] map back to x/y bits and the
// next state.
const LUT_X: u64 = 0x936C;
const LUT_Y: u64 = 0x39C6;
const LUT_STATE: u64 = 0x3E6B_94C1;

/// Number of tiles at all zoom levels below `z`.
fn zoom_prefix(z: u8) -> u64 {
	((1u64 << (2 * u32::from(z))) - 1) / 3
}

/// ry=1: no change. ry=0, rx=0: transpose. ry=0, rx=1: rotate 180 degrees.
///
/// Intermediate coordinates go negative during encoding; only the bits below
/// `s` are consulted afterwards, so signed wrap-around is harmless.
fn rotate(s: i64, x: &mut i64, y: &mut i64, rx: u8, ry: u8) {
	if ry == 0 {
		if rx == 1 {
			*x = s - 1 - *x;
			*y = s - 1 - *y;
		}
		std::mem::swap(x, y);
	}
}

/// Converts `z/x/y` coordinates to a tile id (reference codec, `z <= 26`).
pub fn zxy_to_tile_id(z: u8, x: u64, y: u64) -> Result<u64> {
	ensure!(z <= MAX_ZOOM, "zoom {z} exceeds limit of {MAX_ZOOM}");
	let n = 1u64 << z;
	ensure!(
		x < n && y < n,
		"tile coordinates x/y ({x}/{y}) outside of bounds for zoom {z}"
	);

	let mut acc: i64 = 0;
	let mut tx = x as i64;
	let mut ty = y as i64;

	let mut s = (n >> 1) as i64;
	while s > 0 {
		let rx = u8::from(tx & s > 0);
		let ry = u8::from(ty & s > 0);
		acc += s * s * i64::from((3 * rx) ^ ry);
		rotate(s, &mut tx, &mut ty, rx, ry);
		s /= 2;
	}

	Ok(zoom_prefix(z) + acc as u64)
}

/// Converts a tile id back to `z/x/y` coordinates (reference codec).
pub fn zxy_from_tile_id(tile_id: u64) -> Result<(u8, u64, u64)> {
	ensure!(tile_id < INVALID_TILE_ID, "tile zoom exceeds 64-bit limit");

	let z = zoom_from_tile_id(tile_id);
	ensure!(z <= MAX_ZOOM, "tile zoom level {z} exceeds maximum {MAX_ZOOM}");

	let mut t = tile_id - zoom_prefix(z);
	let mut x: i64 = 0;
	let mut y: i64 = 0;

	for a in 0..z {
		let s = 1i64 << a;
		let rx = ((t >> 1) & 1) as u8;
		let ry = ((t ^ u64::from(rx)) & 1) as u8;
		rotate(s, &mut x, &mut y, rx, ry);
		if rx == 1 {
			x += s;
		}
		if ry == 1 {
			y += s;
		}
		t >>= 2;
	}

	Ok((z, x as u64, y as u64))
}

/// Converts `z/x/y` coordinates to a tile id via lookup tables (`z <= 31`).
pub fn fast_zxy_to_tile_id(z: u8, x: u64, y: u64) -> Result<u64> {
	ensure!(z <= 31, "tile zoom exceeds 64-bit limit");
	ensure!(
		x < 1u64 << z && y < 1u64 << z,
		"tile x/y outside zoom level bounds"
	);

	let mut state = 0u64;
	let mut result = 0u64;

	for i in (0..u32::from(z)).rev() {
		let row = (state << 3) | (((x >> i) & 1) << 2) | (((y >> i) & 1) << 1);
		result = (result << 2) | ((LUT1 >> row) & 3);
		state = (LUT2 >> row) & 3;
	}

	Ok(zoom_prefix(z) + result)
}

/// Converts a tile id back to `z/x/y` coordinates via lookup tables.
pub fn fast_zxy_from_tile_id(tile_id: u64) -> Result<(u8, u64, u64)> {
	ensure!(tile_id < INVALID_TILE_ID, "tile zoom exceeds 64-bit limit");

	let z = zoom_from_tile_id(tile_id);
	let code = tile_id - zoom_prefix(z);

	let mut state = 0u64;
	let mut x = 0u64;
	let mut y = 0u64;

	let mut i = 2 * u32::from(z);
	while i > 0 {
		let row = (state << 2) | ((code >> (i - 2)) & 3);
		x = (x << 1) | ((LUT_X >> row) & 1);
		y = (y << 1) | ((LUT_Y >> row) & 1);
		state = (LUT_STATE >> (2 * row)) & 3;
		i -= 2;
	}

	Ok((z, x, y))
}

/// Extracts the zoom level from a tile id without decoding the coordinates.
///
/// `3 * id + 1` pushes the id past the prefix sum of its own zoom level, so
/// the zoom falls out of the bit length. The caller is responsible for
/// rejecting ids at or above the overflow sentinel.
pub fn zoom_from_tile_id(tile_id: u64) -> u8 {
	let c = 3 * tile_id + 1;
	((63 - c.leading_zeros()) / 2) as u8
}
