//! Maps archive URIs to range readers.
//!
//! Recognized forms: a bare filesystem path, `file://` URIs and
//! `s3://BUCKET/KEY`. Everything else is rejected; transports are chosen
//! here and nowhere else.

use crate::io::{FileReader, ObjectStoreReader, SharedRangeReader};
use anyhow::{anyhow, bail, ensure, Context, Result};
use object_store::{aws::AmazonS3Builder, path::Path as ObjectPath};
use std::{path::Path, sync::Arc};
use url::Url;

/// Builds the range reader for `uri`.
///
/// Surrounding whitespace is trimmed. S3 credentials and region come from the
/// ambient environment (`AWS_*`).
pub fn reader_for(uri: &str) -> Result<SharedRangeReader> {
	let uri = uri.trim();

	match Url::parse(uri) {
		Ok(url) => match url.scheme() {
			"file" => {
				let path = url
					.to_file_path()
					.map_err(|_| anyhow!("invalid file URI {uri:?}"))?;
				Ok(Arc::new(FileReader::open(&path)?))
			}
			"s3" => Ok(Arc::new(s3_reader(&url)?)),
			other => bail!("unsupported URI scheme {other:?} in {uri:?}"),
		},
		// No scheme: a plain filesystem path.
		Err(_) => Ok(Arc::new(FileReader::open(Path::new(uri))?)),
	}
}

fn s3_reader(url: &Url) -> Result<ObjectStoreReader> {
	let bucket = url
		.host_str()
		.filter(|host| !host.is_empty())
		.with_context(|| format!("missing bucket in {url}"))?;
	let key = url.path().trim_start_matches('/');
	ensure!(!key.is_empty(), "missing object key in {url}");

	let store = AmazonS3Builder::from_env()
		.with_bucket_name(bucket)
		.build()
		.with_context(|| format!("configuring S3 client for bucket {bucket:?}"))?;

	Ok(ObjectStoreReader::new(
		Arc::new(store),
		ObjectPath::from(key),
		url.as_str(),
	))
}
