//! Round-trip and literal-fixture coverage for the pack/unpack codec.

use lisa_pack::{pack, unpack};

#[test]
fn property_p5_round_trips_arbitrary_even_length_input() {
    for len in [0usize, 2, 8, 16, 30, 100] {
        let input: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
        let packed = pack(&input, None).unwrap();
        let unpacked = unpack(&packed, input.len(), None).unwrap();
        assert_eq!(unpacked, input, "mismatch for input length {len}");
    }
}

#[test]
fn property_p5_round_trips_with_a_custom_dictionary() {
    let mut custom = [0u16; 256];
    for (i, slot) in custom.iter_mut().enumerate() {
        *slot = (i as u16) * 3;
    }

    let input = [0x00u8, 0x00, 0x00, 0x03, 0x11, 0x22];
    let packed = pack(&input, Some(&custom)).unwrap();
    let unpacked = unpack(&packed, input.len(), Some(&custom)).unwrap();
    assert_eq!(unpacked, input);
}

#[test]
fn property_p6_unpack_fills_exactly_the_declared_size() {
    let input = [0xAAu8, 0xBB, 0xCC, 0xDD];
    let packed = pack(&input, None).unwrap();
    let unpacked = unpack(&packed, input.len(), None).unwrap();
    assert_eq!(unpacked.len(), input.len());
}

#[test]
fn scenario_3_pure_literal_stream_round_trips() {
    let input = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
    let packed = pack(&input, None).unwrap();
    let unpacked = unpack(&packed, input.len(), None).unwrap();
    assert_eq!(unpacked, input);
}

#[test]
fn scenario_4_dictionary_hit_decodes_entry_zero() {
    // flags byte 0x01 (bit 0 set, selecting dictionary index), idx 0x00, footer 0x01 (max_bit=0, odd).
    let packed = [0x01u8, 0x00, 0x01];
    let unpacked = unpack(&packed, 2, None).unwrap();
    assert_eq!(unpacked, vec![0x00, 0x00]);
}

#[test]
fn property_p7_footer_parity_matches_last_group_width_for_every_length() {
    for pair_count in 1..=17usize {
        let input: Vec<u8> = (0..pair_count * 2).map(|i| i as u8).collect();
        let packed = pack(&input, None).unwrap();
        let footer = *packed.last().unwrap();
        let last_group_len = if pair_count % 8 == 0 { 8 } else { pair_count % 8 };
        let max_bit = last_group_len - 1;
        if footer % 2 == 1 {
            assert_eq!(footer as usize, 2 * max_bit + 1, "pair_count={pair_count}");
        } else {
            assert_eq!(footer as usize, 2 * max_bit, "pair_count={pair_count}");
        }
    }
}

#[test]
fn rejects_mismatched_odd_lengths() {
    assert!(pack(&[1u8, 2, 3], None).is_err());
    assert!(unpack(&[1u8, 2, 3], 4, None).is_err());
}
