//! Top-level entry point: load a Lisa object file and walk its tagged blocks.

use crate::block::Payload;
use crate::error::{Error, IoOpenSnafu, IoReadSnafu, MalformedSnafu};
use crate::swap::swap_payload;
use crate::tag::BlockKind;
use snafu::{ensure, ResultExt};
use std::io::Read;
use std::path::Path;

/// One tagged block's position within an [`ObjectFile`]'s image, after normalization.
///
/// Holds only `{kind, offset, size}`; the typed payload view is computed on demand from the
/// owning file's image rather than stored eagerly.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    kind: BlockKind,
    offset: usize,
    size: usize,
}

impl Block {
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Absolute byte offset of this block's 4-byte header within the file image.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of this block in bytes, header included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// This block's payload bytes (everything after the 4-byte header), already normalized to
    /// host byte order.
    #[must_use]
    pub fn payload<'a>(&self, image: &'a [u8]) -> &'a [u8] {
        &image[self.offset + 4..self.offset + self.size]
    }

    /// The kind-dispatched typed view over this block's payload.
    #[must_use]
    pub fn decode<'a>(&self, image: &'a [u8]) -> Payload<'a> {
        Payload::decode(self.kind, self.payload(image))
    }
}

/// A decoded Lisa Workshop object/executable file: an owned image plus the sequence of blocks
/// found within it, up to and including the terminating `EOFMark`.
#[derive(Debug, Clone)]
pub struct ObjectFile {
    image: Box<[u8]>,
    blocks: Vec<Block>,
}

impl ObjectFile {
    /// Reads the file at `path` and parses it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path).context(IoOpenSnafu { path: path.to_path_buf() })?;
        let mut data = Vec::new();
        file.read_to_end(&mut data).context(IoReadSnafu { path: path.to_path_buf() })?;
        log::debug!("read {} bytes from {}", data.len(), path.display());
        Self::from_bytes(data)
    }

    /// Parses an already-loaded image. Exposed separately from [`open`](Self::open) so tests and
    /// embedders can construct an `ObjectFile` from an in-memory buffer.
    pub fn from_bytes(data: impl Into<Box<[u8]>>) -> Result<Self, Error> {
        let mut image: Box<[u8]> = data.into();
        let blocks = parse_blocks(&mut image)?;
        Ok(Self { image, blocks })
    }

    /// The normalized file image. Multi-byte fields inside it are in host byte order.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Every block found, in on-disk order, ending with the terminating `EOFMark`.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// This block's payload bytes, borrowed from this file's image.
    #[must_use]
    pub fn payload(&self, block: &Block) -> &[u8] {
        block.payload(&self.image)
    }

    /// The kind-dispatched typed view over this block's payload, borrowed from this file's image.
    #[must_use]
    pub fn decode(&self, block: &Block) -> Payload<'_> {
        block.decode(&self.image)
    }
}

// Kept as a free function (rather than an `ObjectFile` associated fn) so it can be unit tested
// directly against a bare buffer without going through `std::fs`.
fn parse_blocks(image: &mut [u8]) -> Result<Vec<Block>, Error> {
    let mut blocks = Vec::new();
    let mut offset = 0usize;

    loop {
        ensure!(
            offset + 4 <= image.len(),
            MalformedSnafu {
                reason: format!("block header at offset {offset} runs past end of file"),
            }
        );

        let tag = image[offset];
        let size = ((image[offset + 1] as usize) << 16)
            | ((image[offset + 2] as usize) << 8)
            | (image[offset + 3] as usize);

        ensure!(
            size >= 4,
            MalformedSnafu {
                reason: format!("block at offset {offset} declares size {size}, smaller than its own header"),
            }
        );

        let end = offset.checked_add(size).ok_or_else(|| Error::Malformed {
            reason: format!("block at offset {offset} declares a size that overflows"),
        })?;
        ensure!(
            end <= image.len(),
            MalformedSnafu {
                reason: format!("block at offset {offset} declares size {size}, running past end of file"),
            }
        );

        let kind = BlockKind::try_from(tag).map_err(|_| Error::Malformed {
            reason: format!("block at offset {offset} has unrecognized tag ${tag:02X}"),
        })?;

        swap_payload(kind, &mut image[offset + 4..end])?;
        blocks.push(Block { kind, offset, size });

        if kind == BlockKind::EOFMark {
            log::debug!("found EOFMark at offset {offset}, {} blocks total", blocks.len());
            return Ok(blocks);
        }

        offset = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(tag: u8, size: u32) -> [u8; 4] {
        let bytes = size.to_be_bytes();
        [tag, bytes[1], bytes[2], bytes[3]]
    }

    #[test]
    fn parses_a_minimal_file_with_just_eof_mark() {
        let image = header(0x00, 4).to_vec();
        let file = ObjectFile::from_bytes(image).unwrap();
        assert_eq!(file.blocks().len(), 1);
        assert_eq!(file.blocks()[0].kind(), BlockKind::EOFMark);
    }

    #[test]
    fn rejects_a_file_with_no_eof_mark() {
        let mut image = Vec::new();
        image.extend_from_slice(&header(0x81, 8)); // EndBlock, no terminator follows
        image.extend_from_slice(&[0, 0, 0, 10]);
        assert!(ObjectFile::from_bytes(image).is_err());
    }

    #[test]
    fn ignores_trailing_page_padding_after_eof_mark() {
        let mut image = header(0x00, 4).to_vec();
        image.extend_from_slice(&[0u8; 512]);
        let file = ObjectFile::from_bytes(image).unwrap();
        assert_eq!(file.blocks().len(), 1);
    }

    #[test]
    fn rejects_an_oversized_block_declaration() {
        let mut image = header(0x81, 255).to_vec(); // EndBlock claiming far more than exists
        image.extend_from_slice(&[0, 0, 0, 10]);
        assert!(ObjectFile::from_bytes(image).is_err());
    }

    #[test]
    fn module_name_then_eof_mark_round_trips() {
        let mut image = Vec::new();
        image.extend_from_slice(&header(0x80, 24));
        image.extend_from_slice(b"MOD1    ");
        image.extend_from_slice(b"SEGA    ");
        image.extend_from_slice(&10i32.to_be_bytes());
        image.extend_from_slice(&header(0x00, 4));

        let file = ObjectFile::from_bytes(image).unwrap();
        assert_eq!(file.blocks().len(), 2);
        let crate::block::Payload::ModuleName(view) = file.decode(&file.blocks()[0]) else {
            panic!("expected ModuleName payload");
        };
        assert_eq!(view.module_name().trimmed(), "MOD1");
        assert_eq!(view.segment_name().trimmed(), "SEGA");
        assert_eq!(view.code_size(), 10);
    }
}
