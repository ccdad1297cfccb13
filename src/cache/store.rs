use super::{cache_key, DirectoryCache, MokaDirectoryCache, SingleFlight};
use crate::{
	io::SharedRangeReader,
	types::{ByteRange, Directory, HeaderV3},
	utils::DecompressFn,
};
use anyhow::{Context, Result};
use futures::FutureExt;
use std::sync::Arc;

/// Default number of single-flight shards.
pub const DEFAULT_FLIGHT_SHARDS: usize = 3;

/// Environment override for the single-flight shard count.
pub const ENV_FLIGHT_SHARDS: &str = "PMTILES_FLIGHT_SHARDS";

/// Cached, deduplicated access to the directories of an archive.
///
/// Lookups go through the cache first; misses enter a single-flight group so
/// that concurrent requests for the same directory trigger one load.
#[derive(Clone)]
pub struct DirectoryStore {
	cache: Arc<dyn DirectoryCache>,
	flight: Arc<SingleFlight<Arc<Directory>>>,
}

impl DirectoryStore {
	pub fn new(cache: Arc<dyn DirectoryCache>, flight_shards: usize) -> Self {
		Self {
			cache,
			flight: Arc::new(SingleFlight::new(flight_shards)),
		}
	}

	/// Builds a store with the default cache, honoring the environment
	/// overrides for capacity and shard count.
	pub fn from_env() -> Self {
		Self::new(
			Arc::new(MokaDirectoryCache::from_env()),
			super::env_usize(ENV_FLIGHT_SHARDS, DEFAULT_FLIGHT_SHARDS),
		)
	}

	/// Returns the directory stored at `range`, loading and caching it if
	/// necessary. The range is read as-is; directory bytes are decompressed
	/// with the archive's internal compression before deserializing.
	pub async fn get_or_load(
		&self,
		header: &HeaderV3,
		reader: &SharedRangeReader,
		range: &ByteRange,
		decompress: &DecompressFn,
	) -> Result<Arc<Directory>> {
		let key = cache_key(&header.etag, range.offset, range.length);

		if let Some(directory) = self.cache.get(&key).await {
			log::trace!("directory cache hit for {key}");
			return Ok(directory);
		}

		let load = {
			let cache = self.cache.clone();
			let reader = reader.clone();
			let decompress = decompress.clone();
			let compression = header.internal_compression;
			let range = *range;
			let key = key.clone();
			move || {
				async move {
					// A finished flight may have populated the cache between
					// our miss and this load.
					if let Some(directory) = cache.get(&key).await {
						return Ok(directory);
					}

					let data = reader.read_range(&range).await.context("reading directory range")?;
					let data = decompress(data, compression).context("decompressing directory")?;
					let directory = Directory::deserialize(&data)
						.context("deserializing directory")?
						.with_key(key.clone());
					let directory = Arc::new(directory);

					log::debug!("loaded directory {key} with {} entries", directory.len());
					cache.set(key, directory.clone()).await;

					Ok(directory)
				}
				.boxed()
			}
		};

		self.flight.run(&key, load).await
	}

	pub fn clear(&self) {
		self.cache.clear();
	}

	pub fn close(&self) {
		self.cache.close();
	}
}
