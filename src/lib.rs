//! A read-only client for [PMTiles v3](https://github.com/protomaps/PMTiles) archives.
//!
//! A PMTiles archive is a single blob containing a fixed 127-byte header, a compressed
//! JSON metadata section, a Hilbert-ordered directory tree and the tile data itself.
//! Because every lookup only needs a handful of byte ranges, the archive can be served
//! from any range-capable backend: a local file or an object store.
//!
//! Resolving a tile costs one cached directory walk (at most three hops) and a single
//! range request for the tile body:
//!
//! ```rust,no_run
//! use pmtiles_client::Source;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = Source::open("berlin.pmtiles").await?;
//!
//!     // Empty bytes mean "tile not present", errors mean "archive broken".
//!     let tile = source.tile(14, 8800, 5370).await?;
//!     println!("got {} bytes", tile.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! Remote archives work the same way: `Source::open("s3://bucket/planet.pmtiles")`
//! routes to an object-store backed reader configured from the environment.

pub mod cache;
pub mod io;
pub mod source;
pub mod types;
pub mod uri;
pub mod utils;

pub use source::{Source, SourceBuilder};
pub use types::{ByteRange, Compression, Directory, Entry, HeaderV3, TileType, ZoomRange};
