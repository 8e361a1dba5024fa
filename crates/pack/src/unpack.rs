//! The `SYSTEM.UNPACK` decompressor.
//!
//! Decoding scans both the packed input and the unpacked output **backwards**, from the last byte
//! to the first. A run of flag bits, packed most-recently-encoded-first, each select either a
//! literal 2-byte copy or a dictionary lookup; the very last (i.e. first-encoded) flag byte may use
//! fewer than 8 bits, signaled by a one-byte footer at the very end of the stream.

use crate::dictionary;
use crate::error::{BadAlignmentSnafu, BufferTooSmallSnafu, Error, TruncatedSnafu};
use snafu::ensure;

/// Decodes `packed` into exactly `unpacked_len` bytes, using `dictionary` (or the built-in
/// 256-word table when `None`).
///
/// Both `packed.len()` and `unpacked_len` must be even. Fails with [`Error::Truncated`] if
/// `packed` runs out before `unpacked_len` bytes have been produced, or [`Error::BufferTooSmall`]
/// if decoding would produce more than `unpacked_len` bytes.
pub fn unpack(packed: &[u8], unpacked_len: usize, dictionary: Option<&[u16; 256]>) -> Result<Vec<u8>, Error> {
    ensure!(unpacked_len % 2 == 0, BadAlignmentSnafu { len: unpacked_len });
    if unpacked_len == 0 {
        ensure!(packed.len() % 2 == 0, BadAlignmentSnafu { len: packed.len() });
        return Ok(Vec::new());
    }

    let (unpacked, u) = decode_backwards(packed, unpacked_len, dictionary)?;
    ensure!(u == -1, TruncatedSnafu);
    log::debug!("unpacked {} bytes from {} packed bytes", unpacked_len, packed.len());
    Ok(unpacked)
}

/// Decodes `packed` into a buffer of `capacity` bytes, stopping as soon as the packed stream is
/// exhausted and returning only the bytes actually produced.
///
/// Grounded in the original command-line driver, which has no way to know the true unpacked
/// length up front and instead allocates a generously oversized buffer before decoding into it.
/// Unlike [`unpack`], this does not require the packed stream to fill the buffer exactly.
pub fn unpack_into_capacity(
    packed: &[u8],
    capacity: usize,
    dictionary: Option<&[u16; 256]>,
) -> Result<Vec<u8>, Error> {
    ensure!(capacity % 2 == 0, BadAlignmentSnafu { len: capacity });
    if capacity == 0 {
        ensure!(packed.len() % 2 == 0, BadAlignmentSnafu { len: packed.len() });
        return Ok(Vec::new());
    }

    let (mut unpacked, u) = decode_backwards(packed, capacity, dictionary)?;
    unpacked.drain(..(u + 1) as usize);
    log::debug!("unpacked {} bytes from {} packed bytes into a {capacity}-byte buffer", unpacked.len(), packed.len());
    Ok(unpacked)
}

/// Shared backward-scanning decode loop. Returns the filled buffer (of length `capacity`, with
/// only `capacity - (u + 1)` trailing bytes actually written) alongside the final write cursor
/// `u`; callers decide whether a fully-filled buffer (`u == -1`) is required.
fn decode_backwards(
    packed: &[u8],
    capacity: usize,
    dictionary: Option<&[u16; 256]>,
) -> Result<(Vec<u8>, isize), Error> {
    ensure!(packed.len() % 2 == 0, BadAlignmentSnafu { len: packed.len() });
    ensure!(!packed.is_empty(), TruncatedSnafu);

    let words = dictionary.unwrap_or(&dictionary::DEFAULT);
    let mut unpacked = vec![0u8; capacity];

    // `p`/`u` are the next byte to *read from* / *write to*; both count down to -1 inclusive, so
    // they're tracked as `isize` to let the final step go negative without wrapping.
    let mut p: isize = packed.len() as isize - 1;
    let mut u: isize = capacity as isize - 1;

    let final_byte = packed[p as usize];
    p -= 1;

    let mut max_bit: i32 = if final_byte % 2 == 1 {
        ((final_byte as i32) - 1) / 2
    } else {
        ensure!(p >= 0, TruncatedSnafu);
        p -= 1; // skip the zero slack byte preceding the footer
        (final_byte as i32) / 2
    };

    let mut write = |unpacked: &mut Vec<u8>, u: &mut isize, byte: u8| -> Result<(), Error> {
        ensure!(*u >= 0, BufferTooSmallSnafu { capacity, needed: capacity + 1 });
        unpacked[*u as usize] = byte;
        *u -= 1;
        Ok(())
    };

    while p > 0 {
        let flags = packed[p as usize];
        p -= 1;

        for i in 0..=max_bit {
            let flag = (flags & (1 << i)) != 0;
            if flag {
                ensure!(p >= 0, TruncatedSnafu);
                let word_idx = packed[p as usize] as usize;
                p -= 1;
                let word = words[word_idx].swap_bytes();
                write(&mut unpacked, &mut u, (word >> 8) as u8)?;
                write(&mut unpacked, &mut u, (word & 0xFF) as u8)?;
            } else {
                ensure!(p >= 1, TruncatedSnafu);
                let b0 = packed[p as usize];
                p -= 1;
                let b1 = packed[p as usize];
                p -= 1;
                write(&mut unpacked, &mut u, b0)?;
                write(&mut unpacked, &mut u, b1)?;
            }
        }

        if max_bit < 7 {
            max_bit = 7;
        }
    }

    Ok((unpacked, u))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_length_packed_input() {
        assert!(matches!(unpack(&[0u8; 3], 4, None), Err(Error::BadAlignment { .. })));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(unpack(&[], 0, None).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn dictionary_hit_decodes_entry_zero() {
        // flag byte 0x01 (bit 0 set), dictionary index 0 (entry 0x0000), footer 1 (odd -> max_bit=0).
        let packed = [0x01u8, 0x00, 0x01];
        let out = unpack(&packed, 2, None).unwrap();
        assert_eq!(out, vec![0x00, 0x00]);
    }

    #[test]
    fn literal_pair_round_trips_through_decode() {
        // flag byte 0x00 (bit 0 clear -> literal copy), two literal bytes, odd footer max_bit=0.
        let packed = [0x00u8, 0x11, 0x22, 0x01];
        let out = unpack(&packed, 2, None).unwrap();
        assert_eq!(out, vec![0x11, 0x22]);
    }

    #[test]
    fn even_footer_skips_a_slack_byte() {
        // max_bit=0 via even footer: footer=0 means max_bit=0, preceded by a zero slack byte.
        let packed = [0x00u8, 0x11, 0x22, 0x00, 0x00];
        let out = unpack(&packed, 2, None).unwrap();
        assert_eq!(out, vec![0x11, 0x22]);
    }

    #[test]
    fn truncated_input_is_reported() {
        let packed = [0x01u8, 0x00, 0x01];
        assert!(matches!(unpack(&packed, 4, None), Err(Error::Truncated)));
    }

    #[test]
    fn capacity_decode_trims_unused_leading_bytes() {
        let packed = [0x00u8, 0x11, 0x22, 0x01];
        let out = unpack_into_capacity(&packed, 8, None).unwrap();
        assert_eq!(out, vec![0x11, 0x22]);
    }

    #[test]
    fn capacity_decode_matches_exact_decode_when_capacity_fits_exactly() {
        let packed = [0x01u8, 0x00, 0x01];
        let out = unpack_into_capacity(&packed, 2, None).unwrap();
        assert_eq!(out, unpack(&packed, 2, None).unwrap());
    }
}
