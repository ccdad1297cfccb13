use crate::types::ByteRange;
use anyhow::Result;
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

/// Shared handle to a range reader; cloned into concurrent lookups.
pub type SharedRangeReader = Arc<dyn RangeReader>;

/// Byte-range access to an archive, independent of where it is stored.
///
/// Implementations are safe for concurrent use and own their backing handle
/// for the lifetime of the source.
#[async_trait]
pub trait RangeReader: Debug + Send + Sync {
	/// Reads the bytes of `range`.
	///
	/// A range crossing the end of the underlying object yields the bytes
	/// that exist (possibly none) without an error; anything else that cuts
	/// the payload short is an error.
	async fn read_range(&self, range: &ByteRange) -> Result<Vec<u8>>;

	/// Diagnostic name of the backing source, used in logs and error context.
	fn name(&self) -> &str;
}
