//! Endian-aware primitives shared by the Lisa object-file reader and the Lisa code compression
//! codec: a big-endian/host byte-order layer and a bounds-checked read cursor built on top of it.

pub mod data;
pub mod prelude;
