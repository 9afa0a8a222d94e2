//! Text codec for `mrgaze.cfg` files.

pub mod ini;

pub use ini::{parse_config, serialize_config, MalformedLine, ParseError};
