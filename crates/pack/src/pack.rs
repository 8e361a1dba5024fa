//! The `SYSTEM.UNPACK` compressor: the algorithmic inverse of [`unpack`](crate::unpack::unpack).
//!
//! No reference implementation of this direction survives; everything here is derived from the
//! decoder's documented backward-scanning contract by construction: splitting the input into
//! groups of up to 8 pairs (chunked from the front, so only the last group may be short), and
//! assembling the packed buffer to match the `unpack` is able to play back.

use crate::dictionary;
use crate::error::{BadAlignmentSnafu, Error};
use snafu::ensure;
use std::collections::HashMap;

/// An upper bound on the packed size for an input of `input_len` bytes: one flag bit per 2-byte
/// pair, worst case no dictionary hits at all, plus a footer byte.
#[must_use]
pub fn worst_possible_size(input_len: usize) -> usize {
    input_len * 17 / 16 + 2
}

/// Compresses `input` (which must have even length) using `dictionary` (or the built-in 256-word
/// table when `None`).
pub fn pack(input: &[u8], dictionary: Option<&[u16; 256]>) -> Result<Vec<u8>, Error> {
    ensure!(input.len() % 2 == 0, BadAlignmentSnafu { len: input.len() });

    let words = dictionary.unwrap_or(&dictionary::DEFAULT);
    let index_of = build_reverse_index(words);

    let mut out = Vec::with_capacity(worst_possible_size(input.len()));
    let pairs: Vec<[u8; 2]> = input.chunks_exact(2).map(|c| [c[0], c[1]]).collect();

    if pairs.is_empty() {
        return Ok(out);
    }

    let mut last_max_bit = 0usize;
    for group in pairs.chunks(8) {
        last_max_bit = group.len() - 1;
        let mut flags: u8 = 0;
        let mut payload = Vec::new();

        for (j, pair) in group.iter().enumerate() {
            let value = u16::from_be_bytes(*pair);
            if let Some(&idx) = index_of.get(&value) {
                flags |= 1 << (last_max_bit - j);
                payload.push(idx);
            } else {
                payload.push(pair[0]);
                payload.push(pair[1]);
            }
        }

        out.extend_from_slice(&payload);
        out.push(flags);
    }

    // The footer's parity encodes the last group's `max_bit`; which of the two encodings is used
    // is forced by whatever keeps the overall packed length even (`unpack` requires that).
    if out.len() % 2 == 1 {
        out.push((2 * last_max_bit + 1) as u8);
    } else {
        out.push(0); // slack byte
        out.push((2 * last_max_bit) as u8);
    }

    log::debug!("packed {} bytes into {} bytes", input.len(), out.len());
    Ok(out)
}

/// Maps each dictionary value to the index of its first occurrence, matching the order the real
/// table lists duplicate entries in (`0x0000` appears at both index 0 and 8; index 0 wins).
fn build_reverse_index(words: &[u16; 256]) -> HashMap<u16, u8> {
    let mut map = HashMap::with_capacity(256);
    for (idx, &word) in words.iter().enumerate() {
        map.entry(word).or_insert(idx as u8);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unpack::unpack;

    #[test]
    fn rejects_odd_length_input() {
        assert!(matches!(pack(&[0u8; 3], None), Err(Error::BadAlignment { .. })));
    }

    #[test]
    fn empty_input_packs_to_empty_output() {
        assert_eq!(pack(&[], None).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn literal_stream_round_trips() {
        let input = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
        let packed = pack(&input, None).unwrap();
        let round_tripped = unpack(&packed, input.len(), None).unwrap();
        assert_eq!(round_tripped, input);
    }

    #[test]
    fn dictionary_hit_round_trips() {
        // 0x0000 is dictionary entry 0.
        let input = [0x00u8, 0x00];
        let packed = pack(&input, None).unwrap();
        let round_tripped = unpack(&packed, input.len(), None).unwrap();
        assert_eq!(round_tripped, input);
    }

    #[test]
    fn mixed_nine_pair_stream_spans_two_groups_and_round_trips() {
        let mut input = Vec::new();
        for i in 0..9u16 {
            input.extend_from_slice(&(i * 37).to_be_bytes());
        }
        let packed = pack(&input, None).unwrap();
        let round_tripped = unpack(&packed, input.len(), None).unwrap();
        assert_eq!(round_tripped, input);
    }

    #[test]
    fn footer_parity_encodes_last_group_width() {
        let input = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66];
        let packed = pack(&input, None).unwrap();
        let footer = *packed.last().unwrap();
        assert_eq!(footer % 2, 1, "footer should be odd (no slack byte emitted)");
        assert_eq!(footer as usize, 2 * (3 - 1) + 1);
    }
}
