//! Deterministic, human-readable block dumps, one line per field in on-disk declaration order.

use crate::block::Payload;
use crate::file::{Block, ObjectFile};
use crate::pstring::pstring_at;
use std::fmt::Write as _;

/// Renders `block`'s header line followed by one indented line per field.
///
/// Field order and radix follow the original dump routine: addresses and version words print as
/// `$XXXXXXXX`, counts and sizes print as plain decimal, and 8-byte name fields are trimmed at
/// their first space byte rather than shown with their padding intact.
#[must_use]
pub fn render_block(file: &ObjectFile, block: &Block) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{} (${:02X}), offset {}, {} total bytes",
        block.kind().name(),
        u8::from(block.kind()),
        block.offset(),
        block.size()
    )
    .unwrap();

    match block.decode(file.image()) {
        Payload::EofMark => {}
        Payload::ModuleName(v) => {
            writeln!(out, "\tModuleName: {}", v.module_name().trimmed()).unwrap();
            writeln!(out, "\tSegmentName: {}", v.segment_name().trimmed()).unwrap();
            writeln!(out, "\tCSize: {}", v.code_size()).unwrap();
        }
        Payload::EndBlock(v) => {
            writeln!(out, "\tCSize: {}", v.code_size()).unwrap();
        }
        Payload::EntryPoint(v) => {
            writeln!(out, "\tLinkName: {}", v.link_name().trimmed()).unwrap();
            writeln!(out, "\tUserName: {}", v.user_name().trimmed()).unwrap();
            writeln!(out, "\tLoc: ${:08X}", v.loc()).unwrap();
        }
        Payload::External(v) => {
            writeln!(out, "\tLinkName: {}", v.link_name().trimmed()).unwrap();
            writeln!(out, "\tUserName: {}", v.user_name().trimmed()).unwrap();
            writeln!(out, "\tRefs: {}", v.ref_count()).unwrap();
            for i in 0..v.ref_count() {
                writeln!(out, "\t\tRef[{i}]: ${:08X}", v.reference(i)).unwrap();
            }
        }
        Payload::StartAddress(v) => {
            writeln!(out, "\tStart: ${:08X}", v.start()).unwrap();
            writeln!(out, "\tGSize: {}", v.gsize()).unwrap();
        }
        Payload::CodeBlock(v) => {
            writeln!(out, "\tAddr: ${:08X}", v.addr()).unwrap();
            writeln!(out, "\tCode: {} bytes", v.code().len()).unwrap();
        }
        Payload::Relocation(v) => {
            writeln!(out, "\tRefs: {}", v.ref_count()).unwrap();
            for i in 0..v.ref_count() {
                writeln!(out, "\t\tRef[{i}]: ${:08X}", v.reference(i)).unwrap();
            }
        }
        Payload::CommonRelocation(v) => {
            writeln!(out, "\tCommonName: {}", v.common_name().trimmed()).unwrap();
            writeln!(out, "\tRefs: {}", v.ref_count()).unwrap();
            for i in 0..v.ref_count() {
                writeln!(out, "\t\tRef[{i}]: ${:08X}", v.reference(i)).unwrap();
            }
        }
        Payload::ShortExternal(v) => {
            writeln!(out, "\tLinkName: {}", v.link_name().trimmed()).unwrap();
            writeln!(out, "\tUserName: {}", v.user_name().trimmed()).unwrap();
            writeln!(out, "\tRefs: {}", v.ref_count()).unwrap();
            for i in 0..v.ref_count() {
                writeln!(out, "\t\tShortRef[{i}]: ${:04X}", v.short_reference(i)).unwrap();
            }
        }
        Payload::OldExecutable(_) | Payload::PhysicalExec(_) => {
            writeln!(out, "\tUNIMPLEMENTED").unwrap();
        }
        Payload::UnitBlock(v) => {
            writeln!(out, "\tUnitName: {}", v.unit_name().trimmed()).unwrap();
            writeln!(out, "\tCodeAddr: ${:08X}", v.code_addr()).unwrap();
            writeln!(out, "\tTextAddr: ${:08X}", v.text_addr()).unwrap();
            writeln!(out, "\tTextSize: {}", v.text_size()).unwrap();
            writeln!(out, "\tGlobalSize: {}", v.global_size()).unwrap();
            writeln!(out, "\tUnitType: {}", crate::tag::unit_type_name(v.unit_type_raw())).unwrap();
        }
        Payload::Executable(v) => {
            writeln!(out, "\tJTLaddr: ${:08X}", v.jt_laddr()).unwrap();
            writeln!(out, "\tJTSize: {}", v.jt_size()).unwrap();
            writeln!(out, "\tDataSize: {}", v.data_size()).unwrap();
            writeln!(out, "\tMainSize: {}", v.main_size()).unwrap();
            writeln!(out, "\tJTSegDelta: {}", v.jt_seg_delta()).unwrap();
            writeln!(out, "\tStkSegDelta: {}", v.stk_seg_delta()).unwrap();
            writeln!(out, "\tDynStack: {}", v.dyn_stack()).unwrap();
            writeln!(out, "\tMaxStack: {}", v.max_stack()).unwrap();
            writeln!(out, "\tMinHeap: {}", v.min_heap()).unwrap();
            writeln!(out, "\tMaxHeap: {}", v.max_heap()).unwrap();
            writeln!(out, "\tJTSegVariantTable: {} entries", v.num_segs()).unwrap();
            for i in 0..v.num_segs() as usize {
                let seg = v.jt_seg_variant(i);
                writeln!(
                    out,
                    "\t\t[{i}] SegmentAddr ${:08X}, SizePacked {}, SizeUnpacked {}, MemLoc ${:08X}",
                    seg.segment_addr(),
                    seg.size_packed(),
                    seg.size_unpacked(),
                    seg.mem_loc()
                )
                .unwrap();
            }
            writeln!(out, "\tJTVariantTable: {} entries", v.num_descriptors()).unwrap();
            for i in 0..v.num_descriptors() as usize {
                let var = v.jt_variant(i);
                writeln!(out, "\t\t[{i}] JumpL {}, AbsAddr ${:08X}", var.jump_l(), var.abs_addr()).unwrap();
            }
        }
        Payload::VersionCtrl(v) => {
            writeln!(out, "\tsysNum: ${:08X}", v.sys_num()).unwrap();
            writeln!(out, "\tminSys: ${:08X}", v.min_sys()).unwrap();
            writeln!(out, "\tmaxSys: ${:08X}", v.max_sys()).unwrap();
            writeln!(out, "\tReserv1: ${:08X}", v.reserv1()).unwrap();
            writeln!(out, "\tReserv2: ${:08X}", v.reserv2()).unwrap();
            writeln!(out, "\tReserv3: ${:08X}", v.reserv3()).unwrap();
        }
        Payload::SegmentTable(v) => {
            writeln!(out, "\tnSegments: {}", v.n_segments()).unwrap();
            for i in 0..v.n_segments() as usize {
                let seg = v.variant(i);
                writeln!(
                    out,
                    "\t\t[{i}] SegName {}, SegNumber {}, Version1 ${:08X}, Version2 ${:08X}",
                    seg.seg_name().trimmed(),
                    seg.seg_number(),
                    seg.version1(),
                    seg.version2()
                )
                .unwrap();
            }
        }
        Payload::UnitTable(v) => {
            writeln!(out, "\tnUnits: {}", v.n_units()).unwrap();
            writeln!(out, "\tmaxunit: {}", v.maxunit()).unwrap();
            for i in 0..v.n_units() as usize {
                let unit = v.variant(i);
                writeln!(
                    out,
                    "\t\t[{i}] UnitName {}, UnitNumber {}, UnitType {}",
                    unit.unit_name().trimmed(),
                    unit.unit_number(),
                    crate::tag::unit_type_name(unit.unit_type_raw())
                )
                .unwrap();
            }
        }
        Payload::SegLocation(v) => {
            writeln!(out, "\tnSegments: {}", v.n_segments()).unwrap();
            for i in 0..v.n_segments() as usize {
                let seg = v.variant(i);
                writeln!(
                    out,
                    "\t\t[{i}] SegName {}, SegNumber {}, FileNumber {}, FileLocation ${:08X}, \
                     SizePacked {}, SizeUnpacked {}",
                    seg.seg_name().trimmed(),
                    seg.seg_number(),
                    seg.file_number(),
                    seg.file_location(),
                    seg.size_packed(),
                    seg.size_unpacked()
                )
                .unwrap();
            }
        }
        Payload::UnitLocation(v) => {
            writeln!(out, "\tnUnits: {}", v.n_units()).unwrap();
            for i in 0..v.n_units() as usize {
                let unit = v.variant(i);
                writeln!(
                    out,
                    "\t\t[{i}] UnitName {}, UnitNumber {}, FileNumber {}, UnitType {}, DataSize {}",
                    unit.unit_name().trimmed(),
                    unit.unit_number(),
                    unit.file_number(),
                    unit.unit_type(),
                    unit.data_size()
                )
                .unwrap();
            }
        }
        Payload::StringBlock(v) => {
            writeln!(out, "\tnStrings: {}", v.n_strings()).unwrap();
            for i in 0..v.n_strings() as usize {
                let s = v.variant(i);
                let name = pstring_at(file.image(), s.name_addr())
                    .unwrap_or(std::borrow::Cow::Borrowed("<invalid>"));
                writeln!(out, "\t\t[{i}] FileNumber {}, Name {:?}", s.file_number(), name).unwrap();
            }
        }
        Payload::PackedCode(v) => {
            writeln!(out, "\tAddr: ${:08X}", v.addr()).unwrap();
            writeln!(out, "\tCSize: {}", v.csize()).unwrap();
            let unpacked_len = v.csize().max(0) as usize;
            match lisa_pack::unpack(v.packed_code(), unpacked_len, None) {
                Ok(unpacked) => writeln!(out, "\tUnpacked: {} bytes", unpacked.len()).unwrap(),
                Err(e) => writeln!(out, "\tUnpacked: <error: {e}>").unwrap(),
            }
        }
        Payload::PackTable(v) => {
            writeln!(out, "\tpackversion: {}", v.pack_version()).unwrap();
            if v.pack_version() == 1 {
                writeln!(out, "\twords: {}", v.word_count()).unwrap();
            } else {
                writeln!(out, "\tdata: {} bytes", v.raw_words().len()).unwrap();
            }
        }
        Payload::OsData(v) => {
            writeln!(out, "\tbitmap: {:02X?}", v.bitmap()).unwrap();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(tag: u8, size: u32) -> [u8; 4] {
        let bytes = size.to_be_bytes();
        [tag, bytes[1], bytes[2], bytes[3]]
    }

    #[test]
    fn module_name_renders_trimmed_names() {
        let mut image = Vec::new();
        image.extend_from_slice(&header(0x80, 24));
        image.extend_from_slice(b"MOD1    ");
        image.extend_from_slice(b"SEGA    ");
        image.extend_from_slice(&10i32.to_be_bytes());
        image.extend_from_slice(&header(0x00, 4));

        let file = ObjectFile::from_bytes(image).unwrap();
        let rendered = render_block(&file, &file.blocks()[0]);
        assert!(rendered.contains("ModuleName: MOD1"));
        assert!(rendered.contains("SegmentName: SEGA"));
        assert!(rendered.contains("CSize: 10"));
        assert!(!rendered.contains("MOD1    "));
    }
}
