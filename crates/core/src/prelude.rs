//! Convenience re-exports. `use lisa_core::prelude::*;` pulls in the cursor and byte-order types
//! without needing to know which module they live in.

pub use crate::data::{DataCursor, Endian, EndianRead, SeekFrom};

pub mod data {
    pub use crate::data::Error;
}
