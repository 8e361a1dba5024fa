//! A small, bounds-checked byte cursor with an explicit notion of source byte order.
//!
//! Lisa object files and packed code blocks are always big-endian on disk. Every multi-byte field
//! has to be converted to host order before it can be used, and that conversion only has a sane
//! answer on hosts that are themselves little- or big-endian.

#[cfg(not(any(target_endian = "little", target_endian = "big")))]
compile_error!("lisa-core requires a little- or big-endian target (mixed/PDP-endian hosts are not supported)");

use snafu::prelude::*;

/// Errors produced while walking a [`DataCursor`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// Thrown when a read or seek would run past the end of the underlying buffer.
    #[snafu(display("reached the end of the current stream"))]
    EndOfFile,

    /// Thrown when a seek target cannot be represented (would wrap, or predates offset 0).
    #[snafu(display("seek target {target} is out of range for a buffer of length {length}"))]
    InvalidSeek { target: i64, length: usize },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The byte order a [`DataCursor`] interprets multi-byte reads with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    Little,
    #[default]
    Big,
}

impl Endian {
    /// The byte order native to the host this was compiled for.
    #[inline]
    #[must_use]
    pub const fn host() -> Self {
        #[cfg(target_endian = "little")]
        {
            Endian::Little
        }
        #[cfg(target_endian = "big")]
        {
            Endian::Big
        }
    }
}

/// Mirrors [`std::io::SeekFrom`] without pulling in a hard `std` dependency on the trait surface.
#[derive(Debug, Clone, Copy)]
pub enum SeekFrom {
    Start(u64),
    End(i64),
    Current(i64),
}

/// A value that can be read out of a byte slice in either byte order.
pub trait EndianRead: Sized + Copy {
    /// Size in bytes of the on-disk representation.
    const SIZE: usize;

    fn from_bytes(bytes: &[u8], endian: Endian) -> Self;
}

macro_rules! impl_endian_read {
    ($($t:ty),+ $(,)?) => {
        $(
            impl EndianRead for $t {
                const SIZE: usize = core::mem::size_of::<$t>();

                #[inline]
                fn from_bytes(bytes: &[u8], endian: Endian) -> Self {
                    let mut buf = [0u8; core::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..core::mem::size_of::<$t>()]);
                    match endian {
                        Endian::Little => <$t>::from_le_bytes(buf),
                        Endian::Big => <$t>::from_be_bytes(buf),
                    }
                }
            }
        )+
    };
}

impl_endian_read!(u8, i8, u16, i16, u32, i32);

/// A cursor over an owned, in-memory buffer that reads big- or little-endian primitives with
/// bounds checking on every access.
///
/// `DataCursor` owns its backing storage so that a parsed [`ObjectFile`](../../lisa_obj/struct.ObjectFile.html)
/// can byte-swap fields in place and then hand out long-lived borrows of the same buffer.
#[derive(Debug, Clone)]
pub struct DataCursor {
    data: Box<[u8]>,
    position: usize,
    endian: Endian,
}

impl DataCursor {
    /// Wraps `data`, starting at offset 0 and reading multi-byte values as `endian`.
    #[inline]
    #[must_use]
    pub fn new(data: impl Into<Box<[u8]>>, endian: Endian) -> Self {
        Self { data: data.into(), position: 0, endian }
    }

    #[inline]
    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    #[inline]
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole underlying buffer, independent of cursor position.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// A mutable view of the whole underlying buffer, for in-place byte swapping.
    #[inline]
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    #[must_use]
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.position..]
    }

    pub fn seek(&mut self, from: SeekFrom) -> Result<usize> {
        let target = match from {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(offset) => self.position as i64 + offset,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
        };

        ensure!(
            target >= 0 && (target as usize) <= self.data.len(),
            InvalidSeekSnafu { target, length: self.data.len() }
        );

        self.position = target as usize;
        Ok(self.position)
    }

    /// Reads a bounds-checked slice of `length` bytes and advances the cursor past it.
    pub fn get_slice(&mut self, length: usize) -> Result<&[u8]> {
        let end = self.position.checked_add(length).context(EndOfFileSnafu)?;
        ensure!(end <= self.data.len(), EndOfFileSnafu);

        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Reads one [`EndianRead`] value using the cursor's current byte order.
    pub fn read<T: EndianRead>(&mut self) -> Result<T> {
        let slice = self.get_slice(T::SIZE)?;
        Ok(T::from_bytes(slice, self.endian))
    }

    /// Consumes the cursor, returning ownership of the backing buffer.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Box<[u8]> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_by_default() {
        let mut cursor = DataCursor::new(vec![0x00, 0x80, 0x12, 0x34], Endian::Big);
        assert_eq!(cursor.read::<u16>().unwrap(), 0x0080);
        assert_eq!(cursor.read::<i16>().unwrap(), 0x1234);
    }

    #[test]
    fn read_past_end_is_end_of_file() {
        let mut cursor = DataCursor::new(vec![0x01], Endian::Big);
        assert!(matches!(cursor.read::<u16>(), Err(Error::EndOfFile)));
    }

    #[test]
    fn seek_rejects_out_of_range_targets() {
        let mut cursor = DataCursor::new(vec![0u8; 4], Endian::Big);
        assert!(cursor.seek(SeekFrom::Start(4)).is_ok());
        assert!(cursor.seek(SeekFrom::Start(5)).is_err());
        assert!(cursor.seek(SeekFrom::Current(-10)).is_err());
    }
}
