use crate::types::{Directory, Entry};
use async_trait::async_trait;
use moka::future::Cache;
use std::{mem::size_of, sync::Arc};

/// Default capacity of the directory cache in weighted bytes.
pub const DEFAULT_CACHE_BYTES: u64 = 64 * 1024 * 1024;

/// Environment override for the directory cache capacity.
pub const ENV_CACHE_BYTES: &str = "PMTILES_DIR_CACHE_BYTES";

/// Builds the string every directory is cached under.
///
/// The etag namespaces the key, so directories cached for one version of an
/// archive are never served for another.
pub fn cache_key(etag: &str, offset: u64, length: u64) -> String {
	format!("{etag}:{offset}:{length}")
}

/// Storage contract for cached directories.
///
/// Implementations are internally synchronized. `set` is best effort: a
/// successful insert may still be dropped by admission or eviction, and
/// callers must tolerate a later miss for the same key.
#[async_trait]
pub trait DirectoryCache: Send + Sync {
	async fn get(&self, key: &str) -> Option<Arc<Directory>>;
	async fn set(&self, key: String, directory: Arc<Directory>);
	fn clear(&self);
	fn close(&self);
}

/// The default cache: a bounded, approximately-LFU map weighted by entry
/// payload size. Admission and eviction are eventually consistent.
pub struct MokaDirectoryCache {
	cache: Cache<String, Arc<Directory>>,
}

impl MokaDirectoryCache {
	pub fn new(capacity_bytes: u64) -> Self {
		let cache = Cache::builder()
			.max_capacity(capacity_bytes)
			.weigher(|key: &String, directory: &Arc<Directory>| {
				let bytes = key.len() + directory.len() * size_of::<Entry>();
				bytes.min(u32::MAX as usize) as u32
			})
			.build();
		Self { cache }
	}

	/// Builds the cache with the default capacity, honoring the
	/// `PMTILES_DIR_CACHE_BYTES` override.
	pub fn from_env() -> Self {
		Self::new(super::env_u64(ENV_CACHE_BYTES, DEFAULT_CACHE_BYTES))
	}
}

#[async_trait]
impl DirectoryCache for MokaDirectoryCache {
	async fn get(&self, key: &str) -> Option<Arc<Directory>> {
		self.cache.get(key).await
	}

	async fn set(&self, key: String, directory: Arc<Directory>) {
		self.cache.insert(key, directory).await;
	}

	fn clear(&self) {
		self.cache.invalidate_all();
	}

	fn close(&self) {
		self.cache.invalidate_all();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::Result;

	fn directory() -> Arc<Directory> {
		Arc::new(Directory::deserialize(&[1, 5, 1, 3, 1]).unwrap())
	}

	#[test]
	fn cache_key_format() {
		assert_eq!(cache_key("etag", 127, 246), "etag:127:246");
		assert_eq!(cache_key("", 0, 0), ":0:0");
		assert_eq!(
			cache_key("1HCelDbBkqlVY3B3HNHU5TDpkW4", 2990, 25869006),
			"1HCelDbBkqlVY3B3HNHU5TDpkW4:2990:25869006"
		);
	}

	#[tokio::test]
	async fn set_then_get() -> Result<()> {
		let cache = MokaDirectoryCache::new(DEFAULT_CACHE_BYTES);
		let key = cache_key("etag", 127, 246);

		assert!(cache.get(&key).await.is_none());
		cache.set(key.clone(), directory()).await;
		assert_eq!(cache.get(&key).await.unwrap().len(), 1);
		Ok(())
	}

	#[tokio::test]
	async fn clear_drops_entries() -> Result<()> {
		let cache = MokaDirectoryCache::new(DEFAULT_CACHE_BYTES);
		let key = cache_key("etag", 127, 246);

		cache.set(key.clone(), directory()).await;
		cache.clear();
		cache.cache.run_pending_tasks().await;
		assert!(cache.get(&key).await.is_none());
		Ok(())
	}

	#[tokio::test]
	async fn inserts_are_best_effort() -> Result<()> {
		// A zero-capacity cache accepts the insert and then drops it; callers
		// must tolerate the later miss.
		let cache = MokaDirectoryCache::new(0);
		let key = cache_key("etag", 127, 246);

		cache.set(key.clone(), directory()).await;
		cache.cache.run_pending_tasks().await;
		assert!(cache.get(&key).await.is_none());
		Ok(())
	}

	#[tokio::test]
	async fn distinct_etags_do_not_collide() -> Result<()> {
		let cache = MokaDirectoryCache::new(DEFAULT_CACHE_BYTES);

		cache.set(cache_key("v1", 127, 246), directory()).await;
		assert!(cache.get(&cache_key("v2", 127, 246)).await.is_none());
		Ok(())
	}
}
