mod compression;
pub use compression::*;
