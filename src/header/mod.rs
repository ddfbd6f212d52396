//! Header value reading and the media type values built from it.

mod reader;
mod shared;

pub use self::reader::HeaderReader;
pub use self::shared::*;
