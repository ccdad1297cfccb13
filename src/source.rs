//! The public archive handle: open once, resolve tiles concurrently.

use crate::{
	cache::{env_usize, DirectoryCache, DirectoryStore, SingleFlight, DEFAULT_FLIGHT_SHARDS, ENV_FLIGHT_SHARDS},
	io::SharedRangeReader,
	types::{fast_zxy_to_tile_id, ByteRange, HeaderV3, ZoomRange, HEADER_LENGTH},
	uri,
	utils::{default_decompress, DecompressFn},
};
use anyhow::{bail, ensure, Context, Result};
use futures::FutureExt;
use std::sync::Arc;
use uuid::Uuid;

/// The directory walk shared by plain and coalesced lookups.
#[derive(Clone)]
struct Resolver {
	header: Arc<HeaderV3>,
	reader: SharedRangeReader,
	directories: DirectoryStore,
	decompress: DecompressFn,
}

impl Resolver {
	/// Walks root and leaf directories for `tile_id` and fetches the tile
	/// body. At most three directory levels are visited; archives needing
	/// more are corrupt.
	async fn resolve(self, tile_id: u64) -> Result<Vec<u8>> {
		let mut range = self.header.root_dir;

		for _depth in 0..3 {
			let directory = self
				.directories
				.get_or_load(&self.header, &self.reader, &range, &self.decompress)
				.await?;

			let entry = match directory.find_tile(tile_id) {
				None => return Ok(Vec::new()),
				Some(entry) => *entry,
			};

			if entry.is_leaf_dir() {
				range = ByteRange::new(self.header.leaf_dirs.offset + entry.offset, entry.length);
				continue;
			}

			let body_range = ByteRange::new(entry.offset, entry.length).shifted_forward(self.header.tile_data.offset);
			let data = self
				.reader
				.read_range(&body_range)
				.await
				.context("reading tile range")?;
			let data = (self.decompress)(data, self.header.tile_compression).context("decompressing tile")?;
			return Ok(data);
		}

		bail!("maximum directory depth exceeded")
	}
}

struct TileFlight {
	zooms: ZoomRange,
	flight: SingleFlight<Vec<u8>>,
}

/// A read-only handle to one archive.
///
/// Construction reads the header and metadata once; afterwards the handle is
/// immutable and safe to share across tasks.
pub struct Source {
	resolver: Resolver,
	meta: Vec<u8>,
	tile_flight: Option<TileFlight>,
}

impl std::fmt::Debug for Source {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Source").field("header", &self.resolver.header).finish_non_exhaustive()
	}
}

impl Source {
	/// Opens the archive at `uri` with default options.
	pub async fn open(uri: &str) -> Result<Source> {
		Source::builder().open(uri).await
	}

	pub fn builder() -> SourceBuilder {
		SourceBuilder::default()
	}

	/// Returns the bytes of the tile at `z/x/y`.
	///
	/// Empty bytes mean the archive does not contain this tile; errors mean
	/// the lookup itself failed. Tile payloads are decompressed with the
	/// archive's tile compression before being returned.
	pub async fn tile(&self, z: u8, x: u64, y: u64) -> Result<Vec<u8>> {
		let header = &self.resolver.header;
		ensure!(
			z >= header.min_zoom && z <= header.max_zoom,
			"invalid zoom {z} for allowed range of {} to {}",
			header.min_zoom,
			header.max_zoom
		);

		let tile_id = fast_zxy_to_tile_id(z, x, y)?;
		log::trace!("tile {z}/{x}/{y} -> id {tile_id}");

		if let Some(coalesce) = &self.tile_flight {
			if coalesce.zooms.contains(z) {
				let key = format!("{}:{z}:{x}:{y}", header.etag);
				let resolver = self.resolver.clone();
				return coalesce
					.flight
					.run(&key, move || resolver.resolve(tile_id).boxed())
					.await;
			}
		}

		self.resolver.clone().resolve(tile_id).await
	}

	pub fn header(&self) -> &HeaderV3 {
		&self.resolver.header
	}

	/// The archive's metadata section, decompressed: an opaque JSON blob for
	/// the caller to deserialize. Empty if the archive carries none.
	pub fn meta(&self) -> &[u8] {
		&self.meta
	}

	/// Releases the directory cache. The handle must not be used afterwards.
	pub fn close(&self) {
		self.resolver.directories.close();
	}
}

/// Configures and opens a [`Source`].
#[derive(Default)]
pub struct SourceBuilder {
	reader: Option<SharedRangeReader>,
	cache: Option<Arc<dyn DirectoryCache>>,
	decompress: Option<DecompressFn>,
	etag: Option<String>,
	coalesce_tiles: Option<ZoomRange>,
}

impl SourceBuilder {
	/// Bypasses URI routing and uses a preconstructed reader.
	pub fn with_reader(mut self, reader: SharedRangeReader) -> Self {
		self.reader = Some(reader);
		self
	}

	/// Replaces the default directory cache.
	pub fn with_cache(mut self, cache: Arc<dyn DirectoryCache>) -> Self {
		self.cache = Some(cache);
		self
	}

	/// Replaces the codec dispatch, e.g. to install brotli or zstd.
	pub fn with_decompress(mut self, decompress: DecompressFn) -> Self {
		self.decompress = Some(decompress);
		self
	}

	/// Supplies the archive version tag namespacing all cache keys. Without
	/// it a unique tag is synthesized at open time.
	pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
		self.etag = Some(etag.into());
		self
	}

	/// Additionally coalesces concurrent lookups of the same tile within the
	/// given zoom window.
	pub fn with_tile_coalescing(mut self, zooms: ZoomRange) -> Self {
		self.coalesce_tiles = Some(zooms);
		self
	}

	/// Opens the archive: routes the URI to a reader, parses the header,
	/// loads the metadata blob and initializes cache and single-flight.
	pub async fn open(self, uri: &str) -> Result<Source> {
		let reader = match self.reader {
			Some(reader) => reader,
			None => uri::reader_for(uri)?,
		};
		log::debug!("opening archive {}", reader.name());

		let decompress = self.decompress.unwrap_or_else(default_decompress);

		let header_bytes = reader
			.read_range(&ByteRange::new(0, HEADER_LENGTH))
			.await
			.context("reading header")?;
		let mut header = HeaderV3::deserialize(&header_bytes).context("reading header")?;
		header.etag = self.etag.unwrap_or_else(|| Uuid::new_v4().to_string());
		log::trace!("header: {header:?}");

		let meta = if header.metadata.length == 0 {
			Vec::new()
		} else {
			let data = reader
				.read_range(&header.metadata)
				.await
				.context("reading metadata range")?;
			decompress(data, header.internal_compression).context("decompressing metadata")?
		};

		let directories = match self.cache {
			Some(cache) => DirectoryStore::new(cache, env_usize(ENV_FLIGHT_SHARDS, DEFAULT_FLIGHT_SHARDS)),
			None => DirectoryStore::from_env(),
		};

		let tile_flight = self.coalesce_tiles.map(|zooms| TileFlight {
			zooms,
			flight: SingleFlight::new(env_usize(ENV_FLIGHT_SHARDS, DEFAULT_FLIGHT_SHARDS)),
		});

		Ok(Source {
			resolver: Resolver {
				header: Arc::new(header),
				reader,
				directories,
				decompress,
			},
			meta,
			tile_flight,
		})
	}
}
