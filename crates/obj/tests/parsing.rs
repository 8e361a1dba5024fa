//! Integration tests against the literal fixture bytes, covering the parser, normalizer, and
//! renderer end to end.

use lisa_obj::prelude::*;

fn header(tag: u8, size: u32) -> [u8; 4] {
    let bytes = size.to_be_bytes();
    [tag, bytes[1], bytes[2], bytes[3]]
}

#[test]
fn empty_eof_only_file() {
    let image = header(0x00, 4).to_vec();
    let file = ObjectFile::from_bytes(image).unwrap();

    assert_eq!(file.blocks().len(), 1);
    assert_eq!(file.blocks()[0].kind(), BlockKind::EOFMark);
    assert_eq!(file.blocks()[0].size(), 4);
    assert_eq!(file.blocks()[0].offset(), 0);
}

#[test]
fn minimal_module_name_end_block_eof() {
    let mut image = Vec::new();
    image.extend_from_slice(&header(0x80, 24));
    image.extend_from_slice(b"MOD1    ");
    image.extend_from_slice(b"SEGA    ");
    image.extend_from_slice(&10i32.to_be_bytes());
    image.extend_from_slice(&header(0x81, 8));
    image.extend_from_slice(&0i32.to_be_bytes());
    image.extend_from_slice(&header(0x00, 4));

    let file = ObjectFile::from_bytes(image).unwrap();
    assert_eq!(file.blocks().len(), 3);

    let Payload::ModuleName(module) = file.decode(&file.blocks()[0]) else {
        panic!("expected ModuleName");
    };
    assert_eq!(module.module_name().trimmed(), "MOD1");
    assert_eq!(module.segment_name().trimmed(), "SEGA");
    assert_eq!(module.code_size(), 10);

    let Payload::EndBlock(end) = file.decode(&file.blocks()[1]) else {
        panic!("expected EndBlock");
    };
    assert_eq!(end.code_size(), 0);

    assert_eq!(file.blocks()[2].kind(), BlockKind::EOFMark);

    let rendered = render_block(&file, &file.blocks()[0]);
    assert!(rendered.contains("MOD1"));
    assert!(rendered.contains("SEGA"));
    assert!(!rendered.contains("MOD1    "));
}

#[test]
fn property_p1_block_sizes_sum_to_consumed_range() {
    let mut image = Vec::new();
    image.extend_from_slice(&header(0x81, 8));
    image.extend_from_slice(&42i32.to_be_bytes());
    image.extend_from_slice(&header(0x00, 4));

    let file = ObjectFile::from_bytes(image).unwrap();
    let total: usize = file.blocks().iter().map(|b| b.size()).sum();
    assert_eq!(total, 12);
}

#[test]
fn property_p2_every_block_kind_is_in_the_closed_taxonomy() {
    let mut image = Vec::new();
    image.extend_from_slice(&header(0x86, 8)); // Relocation
    image.extend_from_slice(&100i32.to_be_bytes());
    image.extend_from_slice(&header(0x00, 4));

    let file = ObjectFile::from_bytes(image).unwrap();
    for block in file.blocks() {
        let _ = u8::from(block.kind());
    }
}

#[test]
fn property_p3_eof_mark_only_appears_last() {
    let mut image = Vec::new();
    image.extend_from_slice(&header(0x81, 8));
    image.extend_from_slice(&0i32.to_be_bytes());
    image.extend_from_slice(&header(0x00, 4));

    let file = ObjectFile::from_bytes(image).unwrap();
    let eof_positions: Vec<usize> = file
        .blocks()
        .iter()
        .enumerate()
        .filter(|(_, b)| b.kind() == BlockKind::EOFMark)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(eof_positions, vec![file.blocks().len() - 1]);
}

#[test]
fn rejects_files_missing_an_eof_mark() {
    let mut image = Vec::new();
    image.extend_from_slice(&header(0x81, 8));
    image.extend_from_slice(&0i32.to_be_bytes());
    assert!(ObjectFile::from_bytes(image).is_err());
}

#[test]
fn external_block_ref_count_uses_the_twenty_byte_header_convention() {
    let mut image = Vec::new();
    // 4 (header) + 8 (LinkName) + 8 (UserName) + 2*4 (two Ref entries) = 28
    image.extend_from_slice(&header(0x83, 28));
    image.extend_from_slice(b"LINK    ");
    image.extend_from_slice(b"USER    ");
    image.extend_from_slice(&1i32.to_be_bytes());
    image.extend_from_slice(&2i32.to_be_bytes());
    image.extend_from_slice(&header(0x00, 4));

    let file = ObjectFile::from_bytes(image).unwrap();
    let Payload::External(external) = file.decode(&file.blocks()[0]) else {
        panic!("expected External");
    };
    assert_eq!(external.ref_count(), 2);
    assert_eq!(external.reference(0), 1);
    assert_eq!(external.reference(1), 2);
}

#[test]
fn executable_block_exposes_both_variant_tables() {
    let mut image = Vec::new();
    let mut payload = Vec::new();
    for field in 0..10i32 {
        payload.extend_from_slice(&field.to_be_bytes());
    }
    payload.extend_from_slice(&1i16.to_be_bytes()); // numSegs = 1
    payload.extend_from_slice(&100i32.to_be_bytes()); // SegmentAddr
    payload.extend_from_slice(&4i16.to_be_bytes()); // SizePacked
    payload.extend_from_slice(&8i16.to_be_bytes()); // SizeUnpacked
    payload.extend_from_slice(&200i32.to_be_bytes()); // MemLoc
    payload.extend_from_slice(&1i16.to_be_bytes()); // numDescriptors = 1
    payload.extend_from_slice(&5i16.to_be_bytes()); // JumpL
    payload.extend_from_slice(&300i32.to_be_bytes()); // AbsAddr

    image.extend_from_slice(&header(0x98, (4 + payload.len()) as u32));
    image.extend_from_slice(&payload);
    image.extend_from_slice(&header(0x00, 4));

    let file = ObjectFile::from_bytes(image).unwrap();
    let Payload::Executable(exe) = file.decode(&file.blocks()[0]) else {
        panic!("expected Executable");
    };
    assert_eq!(exe.num_segs(), 1);
    let seg = exe.jt_seg_variant(0);
    assert_eq!(seg.segment_addr(), 100);
    assert_eq!(seg.size_packed(), 4);
    assert_eq!(seg.size_unpacked(), 8);
    assert_eq!(seg.mem_loc(), 200);

    assert_eq!(exe.num_descriptors(), 1);
    let var = exe.jt_variant(0);
    assert_eq!(var.jump_l(), 5);
    assert_eq!(var.abs_addr(), 300);
}
