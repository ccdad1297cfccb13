use super::RangeReader;
use crate::types::ByteRange;
use anyhow::{Context, Result};
use async_trait::async_trait;
use object_store::{path::Path as ObjectPath, ObjectStore};
use std::sync::Arc;

/// Range reader over an object store.
///
/// Every read is a bounded byte-range GET (`Range: bytes=offset-last`, last
/// byte inclusive). The store client is stateless and shared; credentials and
/// region come from the builder that created it.
#[derive(Debug)]
pub struct ObjectStoreReader {
	name: String,
	store: Arc<dyn ObjectStore>,
	location: ObjectPath,
}

impl ObjectStoreReader {
	pub fn new(store: Arc<dyn ObjectStore>, location: ObjectPath, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			store,
			location,
		}
	}
}

#[async_trait]
impl RangeReader for ObjectStoreReader {
	async fn read_range(&self, range: &ByteRange) -> Result<Vec<u8>> {
		range.validate()?;

		match self.store.get_range(&self.location, range.as_range_usize()).await {
			Ok(bytes) => Ok(bytes.to_vec()),
			Err(err) => {
				// Stores reject ranges starting past the end of the object;
				// those surface as an empty payload, not an error. Anything
				// else is a real failure.
				let head = self.store.head(&self.location).await.with_context(|| {
					format!("reading range {range:?} from '{}'", self.name)
				})?;
				if range.offset as usize >= head.size {
					log::debug!(
						"range {range:?} starts past the end of '{}' ({} bytes)",
						self.name,
						head.size
					);
					return Ok(Vec::new());
				}
				Err(err).with_context(|| format!("reading range {range:?} from '{}'", self.name))
			}
		}
	}

	fn name(&self) -> &str {
		&self.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use object_store::{memory::InMemory, PutPayload};

	const TEST_DATA: &[u8] = b"This is some test data for the RangeReader implementation.";

	async fn test_reader() -> Result<ObjectStoreReader> {
		let store = InMemory::new();
		let location = ObjectPath::from("test-object");
		store
			.put(&location, PutPayload::from_static(TEST_DATA))
			.await?;
		Ok(ObjectStoreReader::new(
			Arc::new(store),
			location,
			"s3://test-bucket/test-object",
		))
	}

	#[tokio::test]
	async fn reads_exact_range_mid_object() -> Result<()> {
		let reader = test_reader().await?;
		let data = reader.read_range(&ByteRange::new(5, 10)).await?;
		assert_eq!(data, b"is some te");
		Ok(())
	}

	#[tokio::test]
	async fn reads_full_object() -> Result<()> {
		let reader = test_reader().await?;
		let data = reader
			.read_range(&ByteRange::new(0, TEST_DATA.len() as u64))
			.await?;
		assert_eq!(data, TEST_DATA);
		Ok(())
	}

	#[tokio::test]
	async fn range_crossing_end_is_truncated_without_error() -> Result<()> {
		let reader = test_reader().await?;
		let offset = TEST_DATA.len() as u64 - 5;
		let data = reader.read_range(&ByteRange::new(offset, 50)).await?;
		assert_eq!(data, b"tion.");
		Ok(())
	}

	#[tokio::test]
	async fn range_past_end_is_empty() -> Result<()> {
		let reader = test_reader().await?;
		let data = reader.read_range(&ByteRange::new(1000, 10)).await?;
		assert!(data.is_empty());
		Ok(())
	}

	#[tokio::test]
	async fn zero_length_range_is_rejected() -> Result<()> {
		let reader = test_reader().await?;
		assert!(reader.read_range(&ByteRange::new(0, 0)).await.is_err());
		Ok(())
	}

	#[tokio::test]
	async fn missing_object_is_an_error() -> Result<()> {
		let store = InMemory::new();
		let reader = ObjectStoreReader::new(
			Arc::new(store),
			ObjectPath::from("absent"),
			"s3://test-bucket/absent",
		);
		assert!(reader.read_range(&ByteRange::new(0, 10)).await.is_err());
		Ok(())
	}

	#[test]
	fn name_matches_uri() {
		let reader = ObjectStoreReader::new(
			Arc::new(InMemory::new()),
			ObjectPath::from("test-object"),
			"s3://test-bucket/test-object",
		);
		assert_eq!(reader.name(), "s3://test-bucket/test-object");
	}
}
