//! Bidirectional codec for the Lisa Workshop linker's `SYSTEM.UNPACK` code compression scheme: a
//! backward-scanning dictionary-substitution format used to shrink 68000 code before it's stored
//! in a `PackedCode` block.

pub mod dictionary;
pub mod error;
pub mod pack;
pub mod unpack;

pub use error::Error;
pub use pack::{pack, worst_possible_size};
pub use unpack::{unpack, unpack_into_capacity};
