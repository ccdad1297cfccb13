//! Test-only archive construction: just enough of the write side to exercise
//! the read side end to end.

use flate2::{write::GzEncoder, Compression as GzLevel};
use pmtiles_client::{Compression, Entry};
use std::io::Write;

pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
	while value >= 0x80 {
		out.push((value as u8 & 0x7F) | 0x80);
		value >>= 7;
	}
	out.push(value as u8);
}

pub fn serialize_entries(entries: &[Entry]) -> Vec<u8> {
	let mut out = Vec::new();
	write_varint(&mut out, entries.len() as u64);

	let mut last_id = 0u64;
	for entry in entries {
		write_varint(&mut out, entry.tile_id - last_id);
		last_id = entry.tile_id;
	}
	for entry in entries {
		write_varint(&mut out, u64::from(entry.run_length));
	}
	for entry in entries {
		write_varint(&mut out, entry.length);
	}
	let mut next_byte = 0u64;
	for (i, entry) in entries.iter().enumerate() {
		if i > 0 && entry.offset == next_byte {
			write_varint(&mut out, 0);
		} else {
			write_varint(&mut out, entry.offset + 1);
		}
		next_byte = entry.offset + entry.length;
	}
	out
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
	let mut encoder = GzEncoder::new(Vec::new(), GzLevel::default());
	encoder.write_all(data).unwrap();
	encoder.finish().unwrap()
}

/// A directory node: either a run of tiles pointing into the tile-data
/// section, or a leaf directory with its own children.
pub enum Node {
	Tile(Entry),
	Leaf { tile_id: u64, children: Vec<Node> },
}

pub fn tile_entry(tile_id: u64, offset: u64, length: u64, run_length: u32) -> Node {
	Node::Tile(Entry {
		tile_id,
		offset,
		length,
		run_length,
	})
}

pub struct ArchiveSpec {
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub tile_compression: Compression,
	pub metadata_json: String,
	pub root: Vec<Node>,
	pub tile_data: Vec<u8>,
}

impl Default for ArchiveSpec {
	fn default() -> Self {
		Self {
			min_zoom: 0,
			max_zoom: 3,
			tile_compression: Compression::None,
			metadata_json: String::new(),
			root: Vec::new(),
			tile_data: Vec::new(),
		}
	}
}

/// Serializes a complete archive: header, gzipped root directory, gzipped
/// metadata, leaf-directories section, tile data.
pub fn build_archive(spec: &ArchiveSpec) -> Vec<u8> {
	let mut leaves: Vec<u8> = Vec::new();
	let root_entries = compile(&spec.root, &mut leaves);
	let root_blob = gzip(&serialize_entries(&root_entries));

	let metadata_blob = if spec.metadata_json.is_empty() {
		Vec::new()
	} else {
		gzip(spec.metadata_json.as_bytes())
	};

	let root_offset = 127u64;
	let metadata_offset = root_offset + root_blob.len() as u64;
	let leaf_offset = metadata_offset + metadata_blob.len() as u64;
	let tile_data_offset = leaf_offset + leaves.len() as u64;

	let mut archive = Vec::new();
	archive.extend_from_slice(b"PMTiles");
	archive.push(3);
	for value in [
		root_offset,
		root_blob.len() as u64,
		metadata_offset,
		metadata_blob.len() as u64,
		leaf_offset,
		leaves.len() as u64,
		tile_data_offset,
		spec.tile_data.len() as u64,
		0, // addressed tiles
		0, // tile entries
		0, // tile contents
	] {
		archive.extend_from_slice(&value.to_le_bytes());
	}
	archive.push(1); // clustered
	archive.push(Compression::Gzip as u8);
	archive.push(spec.tile_compression as u8);
	archive.push(1); // mvt
	archive.push(spec.min_zoom);
	archive.push(spec.max_zoom);
	for _ in 0..4 {
		archive.extend_from_slice(&0i32.to_le_bytes());
	}
	archive.push(0);
	for _ in 0..2 {
		archive.extend_from_slice(&0i32.to_le_bytes());
	}
	assert_eq!(archive.len(), 127);

	archive.extend_from_slice(&root_blob);
	archive.extend_from_slice(&metadata_blob);
	archive.extend_from_slice(&leaves);
	archive.extend_from_slice(&spec.tile_data);
	archive
}

fn compile(nodes: &[Node], leaves: &mut Vec<u8>) -> Vec<Entry> {
	nodes
		.iter()
		.map(|node| match node {
			Node::Tile(entry) => *entry,
			Node::Leaf { tile_id, children } => {
				let entries = compile(children, leaves);
				let blob = gzip(&serialize_entries(&entries));
				let offset = leaves.len() as u64;
				leaves.extend_from_slice(&blob);
				Entry {
					tile_id: *tile_id,
					offset,
					length: blob.len() as u64,
					run_length: 0,
				}
			}
		})
		.collect()
}
