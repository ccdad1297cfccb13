use anyhow::{anyhow, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::{
	collections::{hash_map::DefaultHasher, HashMap},
	hash::{Hash, Hasher},
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc, Mutex,
	},
};

type SharedResult<T> = Result<T, Arc<anyhow::Error>>;
type Flight<T> = Shared<BoxFuture<'static, SharedResult<T>>>;

/// Coalesces concurrent identical loads: for each key at most one loader runs
/// at a time, and every concurrent caller shares its result, value or error.
///
/// The flight map is split into hash-selected shards, each behind its own
/// lock, so unrelated keys do not contend. Completed flights are removed by
/// generation token, which keeps a slow follower from evicting a newer flight
/// for the same key.
pub struct SingleFlight<T: Clone> {
	shards: Vec<Mutex<HashMap<String, (u64, Flight<T>)>>>,
	next_token: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
	pub fn new(shard_count: usize) -> Self {
		let shard_count = shard_count.max(1);
		Self {
			shards: (0..shard_count).map(|_| Mutex::new(HashMap::new())).collect(),
			next_token: AtomicU64::new(0),
		}
	}

	fn shard(&self, key: &str) -> &Mutex<HashMap<String, (u64, Flight<T>)>> {
		let mut hasher = DefaultHasher::new();
		key.hash(&mut hasher);
		&self.shards[hasher.finish() as usize % self.shards.len()]
	}

	/// Runs `load` for `key`, or joins a load already in flight for it.
	///
	/// Blocks until the flight completes. A caller that drops its future
	/// simply stops driving the shared load; remaining callers complete it.
	pub async fn run<F>(&self, key: &str, load: F) -> Result<T>
	where
		F: FnOnce() -> BoxFuture<'static, Result<T>>,
	{
		let shard = self.shard(key);

		let (token, flight) = {
			let mut flights = shard.lock().unwrap();
			if let Some((token, flight)) = flights.get(key) {
				log::trace!("joining load in flight for key {key:?}");
				(*token, flight.clone())
			} else {
				let token = self.next_token.fetch_add(1, Ordering::Relaxed);
				let flight = load().map(|result| result.map_err(Arc::new)).boxed().shared();
				flights.insert(key.to_string(), (token, flight.clone()));
				(token, flight)
			}
		};

		let result = flight.await;

		{
			let mut flights = shard.lock().unwrap();
			if matches!(flights.get(key), Some((current, _)) if *current == token) {
				flights.remove(key);
			}
		}

		result.map_err(|err| anyhow!("{err:#}"))
	}
}
