//! Error taxonomy for opening, parsing, and interpreting a Lisa object file.

use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("unable to open object file {path:?}"))]
    IoOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("unable to read object file {path:?}"))]
    IoRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("malformed object file: {reason}"))]
    Malformed { reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
