//! The `.bgl` scene file. Everything is little-endian; see [`writer`] for
//! the record order.

pub mod reader;
pub mod writer;

pub const MAGIC: &[u8; 5] = b"BOGLE";
pub const VERSION: u8 = 0;
/// Longest object name; the field holds one more byte for the NUL.
pub const OBJECT_NAME_LEN: usize = 31;
pub const OBJECT_NAME_FIELD: usize = OBJECT_NAME_LEN + 1;

/// Record type byte of every table except lights, whose type is their kind.
pub const BASIC_TYPE: u8 = 0;
/// Shader byte of material records.
pub const UBER_SHADER: u8 = 0;

pub use reader::{decode_scene, read_scene, SceneSummary};
pub use writer::{encode_scene, write_scene};
