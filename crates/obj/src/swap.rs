//! In-place big-endian-to-host normalization of a block's payload bytes.
//!
//! Every block is read into memory still in its on-disk big-endian byte order. This module walks
//! each payload exactly once, swapping every multi-byte field directly in the owning buffer, the
//! same way the original swaps struct fields in place on little-endian hosts. Byte fields (8-byte
//! names, raw bitmaps, packed code bytes) are left untouched.

use crate::error::{Error, MalformedSnafu};
use crate::tag::BlockKind;
use lisa_core::data::{Endian, EndianRead};
use snafu::ensure;

#[inline]
fn swap_u16(payload: &mut [u8], offset: usize) {
    let v = u16::from_bytes(&payload[offset..offset + 2], Endian::Big);
    payload[offset..offset + 2].copy_from_slice(&v.to_ne_bytes());
}

#[inline]
fn swap_i16(payload: &mut [u8], offset: usize) {
    let v = i16::from_bytes(&payload[offset..offset + 2], Endian::Big);
    payload[offset..offset + 2].copy_from_slice(&v.to_ne_bytes());
}

#[inline]
fn swap_u32(payload: &mut [u8], offset: usize) {
    let v = u32::from_bytes(&payload[offset..offset + 4], Endian::Big);
    payload[offset..offset + 4].copy_from_slice(&v.to_ne_bytes());
}

#[inline]
fn swap_i32(payload: &mut [u8], offset: usize) {
    let v = i32::from_bytes(&payload[offset..offset + 4], Endian::Big);
    payload[offset..offset + 4].copy_from_slice(&v.to_ne_bytes());
}

#[inline]
fn read_i16_ne(payload: &[u8], offset: usize) -> i16 {
    i16::from_bytes(&payload[offset..offset + 2], Endian::host())
}

/// Normalizes `payload` (a block's bytes, excluding its 4-byte header) for `kind`, in place.
///
/// Returns `Malformed` if `payload` is too short for `kind`'s fixed part, or if a trailing array
/// does not divide evenly.
pub(crate) fn swap_payload(kind: BlockKind, payload: &mut [u8]) -> Result<(), Error> {
    ensure!(
        payload.len() >= kind.min_payload_len(),
        MalformedSnafu {
            reason: format!(
                "{} payload is {} bytes, need at least {}",
                kind.name(),
                payload.len(),
                kind.min_payload_len()
            ),
        }
    );

    match kind {
        BlockKind::EOFMark | BlockKind::OldExecutable | BlockKind::PhysicalExec | BlockKind::OSData => {
            // No numeric fields (OSData's bitmap is raw bytes); OldExecutable/PhysicalExec are
            // unimplemented upstream and carried through as opaque bytes.
        }

        BlockKind::ModuleName => {
            swap_i32(payload, 16);
        }
        BlockKind::EndBlock => {
            swap_i32(payload, 0);
        }
        BlockKind::EntryPoint => {
            swap_i32(payload, 16);
        }
        BlockKind::External => {
            let count = array_count(payload.len(), 16, 4, kind)?;
            for i in 0..count {
                swap_i32(payload, 16 + i * 4);
            }
        }
        BlockKind::StartAddress => {
            swap_i32(payload, 0);
            swap_i32(payload, 4);
        }
        BlockKind::CodeBlock => {
            swap_i32(payload, 0);
        }
        BlockKind::Relocation => {
            let count = array_count(payload.len(), 0, 4, kind)?;
            for i in 0..count {
                swap_i32(payload, i * 4);
            }
        }
        BlockKind::CommonRelocation => {
            let count = array_count(payload.len(), 8, 4, kind)?;
            for i in 0..count {
                swap_i32(payload, 8 + i * 4);
            }
        }
        BlockKind::ShortExternal => {
            let count = array_count(payload.len(), 16, 2, kind)?;
            for i in 0..count {
                swap_i16(payload, 16 + i * 2);
            }
        }
        BlockKind::UnitBlock => {
            swap_i32(payload, 8);
            swap_i32(payload, 12);
            swap_i32(payload, 16);
            swap_i32(payload, 20);
            swap_i16(payload, 24);
        }
        BlockKind::Executable => swap_executable(payload)?,
        BlockKind::VersionCtrl => {
            for field in 0..6 {
                swap_i32(payload, field * 4);
            }
        }
        BlockKind::SegmentTable => {
            swap_i16(payload, 0);
            let n = read_i16_ne(payload, 0) as usize;
            ensure_array_fits(payload.len(), 2, n, 18, kind)?;
            for i in 0..n {
                let base = 2 + i * 18;
                swap_i16(payload, base + 8);
                swap_i32(payload, base + 10);
                swap_i32(payload, base + 14);
            }
        }
        BlockKind::UnitTable => {
            swap_i16(payload, 0);
            swap_i16(payload, 2);
            let n = read_i16_ne(payload, 0) as usize;
            ensure_array_fits(payload.len(), 4, n, 12, kind)?;
            for i in 0..n {
                let base = 4 + i * 12;
                swap_i16(payload, base + 8);
                swap_i16(payload, base + 10);
            }
        }
        BlockKind::SegLocation => {
            swap_i16(payload, 0);
            let n = read_i16_ne(payload, 0) as usize;
            ensure_array_fits(payload.len(), 2, n, 28, kind)?;
            for i in 0..n {
                let base = 2 + i * 28;
                // SegNumber, like SegName, is left in its on-disk byte order; the original swap
                // routine never touches it here (unlike SegmentTable's/UnitTable's number fields).
                swap_i32(payload, base + 10);
                swap_i32(payload, base + 14);
                swap_i16(payload, base + 18);
                swap_i32(payload, base + 20);
                swap_i16(payload, base + 24);
                swap_i16(payload, base + 26);
            }
        }
        BlockKind::UnitLocation => {
            swap_i16(payload, 0);
            let n = read_i16_ne(payload, 0) as usize;
            ensure_array_fits(payload.len(), 2, n, 16, kind)?;
            for i in 0..n {
                let base = 2 + i * 16;
                swap_i16(payload, base + 8);
                // FileNumber/UnitType at base+10/+11 are raw bytes, not swapped.
                swap_i32(payload, base + 12);
            }
        }
        BlockKind::StringBlock => {
            swap_i16(payload, 0);
            let n = read_i16_ne(payload, 0) as usize;
            ensure_array_fits(payload.len(), 2, n, 6, kind)?;
            for i in 0..n {
                let base = 2 + i * 6;
                swap_i16(payload, base);
                swap_u32(payload, base + 2);
            }
        }
        BlockKind::PackedCode => {
            swap_i32(payload, 0);
            swap_i32(payload, 4);
            // Packed code bytes are the compressed wire format, not swappable fields.
        }
        BlockKind::PackTable => {
            swap_i32(payload, 0);
            // Dictionary words are swapped lazily at lookup time; see `block::PackTableView`.
        }
    }

    Ok(())
}

fn array_count(payload_len: usize, header_len: usize, entry_len: usize, kind: BlockKind) -> Result<usize, Error> {
    let remainder = payload_len.checked_sub(header_len).ok_or_else(|| Error::Malformed {
        reason: format!("{} payload shorter than its fixed header", kind.name()),
    })?;
    ensure!(
        remainder % entry_len == 0,
        MalformedSnafu {
            reason: format!(
                "{} trailing array of {} bytes does not divide evenly into {}-byte entries",
                kind.name(),
                remainder,
                entry_len
            ),
        }
    );
    Ok(remainder / entry_len)
}

fn ensure_array_fits(
    payload_len: usize,
    header_len: usize,
    count: usize,
    entry_len: usize,
    kind: BlockKind,
) -> Result<(), Error> {
    let needed = header_len + count * entry_len;
    ensure!(
        payload_len >= needed,
        MalformedSnafu {
            reason: format!(
                "{} declares {} entries needing {} bytes, payload is only {} bytes",
                kind.name(),
                count,
                needed,
                payload_len
            ),
        }
    );
    Ok(())
}

/// `Executable` carries two variable-length inner tables whose locations depend on each other:
/// `JTSegVariantTable` sits at a fixed payload offset, but `JTVariantTable` only starts once the
/// segment table's (just-swapped) entry count is known. Each table's count must be swapped before
/// its entries can be located.
fn swap_executable(payload: &mut [u8]) -> Result<(), Error> {
    for field in 0..10 {
        swap_i32(payload, field * 4);
    }

    const JT_SEG_TABLE_OFFSET: usize = 40;
    swap_i16(payload, JT_SEG_TABLE_OFFSET);
    let num_segs = read_i16_ne(payload, JT_SEG_TABLE_OFFSET) as usize;
    ensure_array_fits(payload.len(), JT_SEG_TABLE_OFFSET + 2, num_segs, 12, BlockKind::Executable)?;
    for i in 0..num_segs {
        let base = JT_SEG_TABLE_OFFSET + 2 + i * 12;
        swap_i32(payload, base);
        swap_i16(payload, base + 4);
        swap_i16(payload, base + 6);
        swap_i32(payload, base + 8);
    }

    let jt_variant_table_offset = JT_SEG_TABLE_OFFSET + 2 + num_segs * 12;
    ensure!(
        payload.len() >= jt_variant_table_offset + 2,
        MalformedSnafu {
            reason: "Executable payload too short for JTVariantTable count".to_string(),
        }
    );
    swap_i16(payload, jt_variant_table_offset);
    let num_descriptors = read_i16_ne(payload, jt_variant_table_offset) as usize;
    ensure_array_fits(payload.len(), jt_variant_table_offset + 2, num_descriptors, 6, BlockKind::Executable)?;
    for i in 0..num_descriptors {
        let base = jt_variant_table_offset + 2 + i * 6;
        swap_i16(payload, base);
        swap_i32(payload, base + 2);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_block_swaps_code_size() {
        let mut payload = vec![0x00, 0x00, 0x00, 0x0A];
        swap_payload(BlockKind::EndBlock, &mut payload).unwrap();
        assert_eq!(i32::from_ne_bytes(payload.try_into().unwrap()), 10);
    }

    #[test]
    fn external_rejects_uneven_trailing_array() {
        let mut payload = vec![0u8; 16 + 3];
        let err = swap_payload(BlockKind::External, &mut payload).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn relocation_swaps_every_reference() {
        let mut payload = vec![0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00];
        swap_payload(BlockKind::Relocation, &mut payload).unwrap();
        let first = i32::from_ne_bytes(payload[0..4].try_into().unwrap());
        let second = i32::from_ne_bytes(payload[4..8].try_into().unwrap());
        assert_eq!(first, 0x100);
        assert_eq!(second, 0x200);
    }
}
