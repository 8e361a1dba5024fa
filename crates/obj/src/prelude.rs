//! Common imports for working with a parsed object file.

pub use crate::block::{Name, Payload};
pub use crate::file::{Block, ObjectFile};
pub use crate::render::render_block;
pub use crate::tag::BlockKind;

pub mod obj {
    pub use crate::error::Error;
}
