//! Error taxonomy for the pack/unpack codec.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("pack table version {version} is not supported (only version 1 is)"))]
    UnsupportedTable { version: i32 },

    #[snafu(display("buffer of {len} bytes has odd length, codec requires an even number of bytes"))]
    BadAlignment { len: usize },

    #[snafu(display("output buffer of {capacity} bytes cannot hold {needed} bytes"))]
    BufferTooSmall { capacity: usize, needed: usize },

    #[snafu(display("packed stream ran out of input before producing the declared output size"))]
    Truncated,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
