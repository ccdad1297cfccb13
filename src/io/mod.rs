//! Byte-level input: the range-reader transport seam and the little-endian
//! value reader used by the header and directory codecs.

mod file_reader;
pub use file_reader::*;

mod object_store_reader;
pub use object_store_reader::*;

mod range_reader;
pub use range_reader::*;

mod value_reader;
pub use value_reader::*;
