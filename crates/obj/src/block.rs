//! Typed, borrowed views over a decoded block's already-normalized payload bytes.
//!
//! None of these own storage: every accessor reads directly out of the slice the view was built
//! from, which is always a sub-slice of the owning [`ObjectFile`](crate::file::ObjectFile)'s image.

use crate::tag::{BlockKind, UnitType};
use lisa_core::data::{Endian, EndianRead};

#[inline]
fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_bytes(&data[offset..offset + 2], Endian::host())
}

#[inline]
fn i16_at(data: &[u8], offset: usize) -> i16 {
    i16::from_bytes(&data[offset..offset + 2], Endian::host())
}

#[inline]
fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_bytes(&data[offset..offset + 4], Endian::host())
}

#[inline]
fn i32_at(data: &[u8], offset: usize) -> i32 {
    i32::from_bytes(&data[offset..offset + 4], Endian::host())
}

#[inline]
fn name8_at(data: &[u8], offset: usize) -> [u8; 8] {
    data[offset..offset + 8].try_into().unwrap()
}

/// Reads a field the normalizer deliberately leaves untouched, still in its on-disk big-endian
/// order (unlike `i16_at`, which assumes the normalizer already swapped it to host order).
#[inline]
fn raw_i16_be_at(data: &[u8], offset: usize) -> i16 {
    i16::from_bytes(&data[offset..offset + 2], Endian::Big)
}

/// A fixed-width name field (`ModuleName`, `LinkName`, `SegName`, ...): 8 bytes, space-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name(pub [u8; 8]);

impl Name {
    /// The name with its trailing space padding removed, lossily decoded as UTF-8.
    #[must_use]
    pub fn trimmed(&self) -> std::borrow::Cow<'_, str> {
        let end = self.0.iter().position(|&b| b == b' ').unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end])
    }
}

macro_rules! view {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a>(pub(crate) &'a [u8]);
    };
}

view!(ModuleNameView);
impl<'a> ModuleNameView<'a> {
    pub fn module_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn segment_name(&self) -> Name {
        Name(name8_at(self.0, 8))
    }
    pub fn code_size(&self) -> i32 {
        i32_at(self.0, 16)
    }
}

view!(EndBlockView);
impl<'a> EndBlockView<'a> {
    pub fn code_size(&self) -> i32 {
        i32_at(self.0, 0)
    }
}

view!(EntryPointView);
impl<'a> EntryPointView<'a> {
    pub fn link_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn user_name(&self) -> Name {
        Name(name8_at(self.0, 8))
    }
    pub fn loc(&self) -> i32 {
        i32_at(self.0, 16)
    }
}

view!(ExternalView);
impl<'a> ExternalView<'a> {
    pub fn link_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn user_name(&self) -> Name {
        Name(name8_at(self.0, 8))
    }
    pub fn ref_count(&self) -> usize {
        (self.0.len() - 16) / 4
    }
    pub fn reference(&self, index: usize) -> i32 {
        i32_at(self.0, 16 + index * 4)
    }
}

view!(StartAddressView);
impl<'a> StartAddressView<'a> {
    pub fn start(&self) -> i32 {
        i32_at(self.0, 0)
    }
    pub fn gsize(&self) -> i32 {
        i32_at(self.0, 4)
    }
}

view!(CodeBlockView);
impl<'a> CodeBlockView<'a> {
    pub fn addr(&self) -> i32 {
        i32_at(self.0, 0)
    }
    pub fn code(&self) -> &'a [u8] {
        &self.0[4..]
    }
}

view!(RelocationView);
impl<'a> RelocationView<'a> {
    pub fn ref_count(&self) -> usize {
        self.0.len() / 4
    }
    pub fn reference(&self, index: usize) -> i32 {
        i32_at(self.0, index * 4)
    }
}

view!(CommonRelocationView);
impl<'a> CommonRelocationView<'a> {
    pub fn common_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn ref_count(&self) -> usize {
        (self.0.len() - 8) / 4
    }
    pub fn reference(&self, index: usize) -> i32 {
        i32_at(self.0, 8 + index * 4)
    }
}

view!(ShortExternalView);
impl<'a> ShortExternalView<'a> {
    pub fn link_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn user_name(&self) -> Name {
        Name(name8_at(self.0, 8))
    }
    pub fn ref_count(&self) -> usize {
        (self.0.len() - 16) / 2
    }
    pub fn short_reference(&self, index: usize) -> i16 {
        i16_at(self.0, 16 + index * 2)
    }
}

view!(UnitBlockView);
impl<'a> UnitBlockView<'a> {
    pub fn unit_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn code_addr(&self) -> i32 {
        i32_at(self.0, 8)
    }
    pub fn text_addr(&self) -> i32 {
        i32_at(self.0, 12)
    }
    pub fn text_size(&self) -> i32 {
        i32_at(self.0, 16)
    }
    pub fn global_size(&self) -> i32 {
        i32_at(self.0, 20)
    }
    pub fn unit_type_raw(&self) -> i16 {
        i16_at(self.0, 24)
    }
    pub fn unit_type(&self) -> Option<UnitType> {
        UnitType::try_from(self.unit_type_raw()).ok()
    }
}

/// One entry of an `Executable` block's jump-table segment variant table.
#[derive(Debug, Clone, Copy)]
pub struct JtSegVariant<'a>(&'a [u8]);
impl<'a> JtSegVariant<'a> {
    pub fn segment_addr(&self) -> i32 {
        i32_at(self.0, 0)
    }
    pub fn size_packed(&self) -> i16 {
        i16_at(self.0, 4)
    }
    pub fn size_unpacked(&self) -> i16 {
        i16_at(self.0, 6)
    }
    pub fn mem_loc(&self) -> i32 {
        i32_at(self.0, 8)
    }
}

/// One entry of an `Executable` block's jump-table descriptor table.
#[derive(Debug, Clone, Copy)]
pub struct JtVariant<'a>(&'a [u8]);
impl<'a> JtVariant<'a> {
    pub fn jump_l(&self) -> i16 {
        i16_at(self.0, 0)
    }
    pub fn abs_addr(&self) -> i32 {
        i32_at(self.0, 2)
    }
}

view!(ExecutableView);
impl<'a> ExecutableView<'a> {
    pub fn jt_laddr(&self) -> i32 {
        i32_at(self.0, 0)
    }
    pub fn jt_size(&self) -> i32 {
        i32_at(self.0, 4)
    }
    pub fn data_size(&self) -> i32 {
        i32_at(self.0, 8)
    }
    pub fn main_size(&self) -> i32 {
        i32_at(self.0, 12)
    }
    pub fn jt_seg_delta(&self) -> i32 {
        i32_at(self.0, 16)
    }
    pub fn stk_seg_delta(&self) -> i32 {
        i32_at(self.0, 20)
    }
    pub fn dyn_stack(&self) -> i32 {
        i32_at(self.0, 24)
    }
    pub fn max_stack(&self) -> i32 {
        i32_at(self.0, 28)
    }
    pub fn min_heap(&self) -> i32 {
        i32_at(self.0, 32)
    }
    pub fn max_heap(&self) -> i32 {
        i32_at(self.0, 36)
    }

    /// Offset, within the payload, of `numSegs`: immediately after the ten 32-bit header fields.
    const JT_SEG_TABLE_OFFSET: usize = 40;

    pub fn num_segs(&self) -> i16 {
        i16_at(self.0, Self::JT_SEG_TABLE_OFFSET)
    }

    pub fn jt_seg_variant(&self, index: usize) -> JtSegVariant<'a> {
        let start = Self::JT_SEG_TABLE_OFFSET + 2 + index * 12;
        JtSegVariant(&self.0[start..start + 12])
    }

    /// Offset, within the payload, of `numDescriptors`: immediately after the segment table's
    /// `numSegs` count and all of its entries. `numSegs` must already have been swapped.
    fn jt_variant_table_offset(&self) -> usize {
        Self::JT_SEG_TABLE_OFFSET + 2 + (self.num_segs() as usize) * 12
    }

    pub fn num_descriptors(&self) -> i16 {
        i16_at(self.0, self.jt_variant_table_offset())
    }

    pub fn jt_variant(&self, index: usize) -> JtVariant<'a> {
        let start = self.jt_variant_table_offset() + 2 + index * 6;
        JtVariant(&self.0[start..start + 6])
    }
}

view!(VersionCtrlView);
impl<'a> VersionCtrlView<'a> {
    pub fn sys_num(&self) -> i32 {
        i32_at(self.0, 0)
    }
    pub fn min_sys(&self) -> i32 {
        i32_at(self.0, 4)
    }
    pub fn max_sys(&self) -> i32 {
        i32_at(self.0, 8)
    }
    pub fn reserv1(&self) -> i32 {
        i32_at(self.0, 12)
    }
    pub fn reserv2(&self) -> i32 {
        i32_at(self.0, 16)
    }
    pub fn reserv3(&self) -> i32 {
        i32_at(self.0, 20)
    }
}

/// One entry of a `SegmentTable` block.
#[derive(Debug, Clone, Copy)]
pub struct SegVariant<'a>(&'a [u8]);
impl<'a> SegVariant<'a> {
    pub fn seg_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn seg_number(&self) -> i16 {
        i16_at(self.0, 8)
    }
    pub fn version1(&self) -> i32 {
        i32_at(self.0, 10)
    }
    pub fn version2(&self) -> i32 {
        i32_at(self.0, 14)
    }
}

view!(SegmentTableView);
impl<'a> SegmentTableView<'a> {
    pub fn n_segments(&self) -> i16 {
        i16_at(self.0, 0)
    }
    pub fn variant(&self, index: usize) -> SegVariant<'a> {
        let start = 2 + index * 18;
        SegVariant(&self.0[start..start + 18])
    }
}

/// One entry of a `UnitTable` block.
#[derive(Debug, Clone, Copy)]
pub struct UnitVariant<'a>(&'a [u8]);
impl<'a> UnitVariant<'a> {
    pub fn unit_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn unit_number(&self) -> i16 {
        i16_at(self.0, 8)
    }
    pub fn unit_type_raw(&self) -> i16 {
        i16_at(self.0, 10)
    }
    pub fn unit_type(&self) -> Option<UnitType> {
        UnitType::try_from(self.unit_type_raw()).ok()
    }
}

view!(UnitTableView);
impl<'a> UnitTableView<'a> {
    pub fn n_units(&self) -> i16 {
        i16_at(self.0, 0)
    }
    pub fn maxunit(&self) -> i16 {
        i16_at(self.0, 2)
    }
    pub fn variant(&self, index: usize) -> UnitVariant<'a> {
        let start = 4 + index * 12;
        UnitVariant(&self.0[start..start + 12])
    }
}

/// One entry of a `SegLocation` block. Unlike `SegmentTable`'s entries, `SegNumber` here is a raw
/// unswapped field, same as `SegName`.
#[derive(Debug, Clone, Copy)]
pub struct SegLocVariant<'a>(&'a [u8]);
impl<'a> SegLocVariant<'a> {
    pub fn seg_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    /// Left in on-disk byte order; the normalizer never swaps this field (see `swap.rs`).
    pub fn seg_number(&self) -> i16 {
        raw_i16_be_at(self.0, 8)
    }
    pub fn version1(&self) -> i32 {
        i32_at(self.0, 10)
    }
    pub fn version2(&self) -> i32 {
        i32_at(self.0, 14)
    }
    pub fn file_number(&self) -> i16 {
        i16_at(self.0, 18)
    }
    pub fn file_location(&self) -> i32 {
        i32_at(self.0, 20)
    }
    pub fn size_packed(&self) -> i16 {
        i16_at(self.0, 24)
    }
    pub fn size_unpacked(&self) -> i16 {
        i16_at(self.0, 26)
    }
}

view!(SegLocationView);
impl<'a> SegLocationView<'a> {
    pub fn n_segments(&self) -> i16 {
        i16_at(self.0, 0)
    }
    pub fn variant(&self, index: usize) -> SegLocVariant<'a> {
        let start = 2 + index * 28;
        SegLocVariant(&self.0[start..start + 28])
    }
}

/// One entry of a `UnitLocation` block. Unlike `UnitTable`'s entries, `FileNumber`/`UnitType`
/// here are raw bytes, not swapped 16-bit fields.
#[derive(Debug, Clone, Copy)]
pub struct UnitLVariant<'a>(&'a [u8]);
impl<'a> UnitLVariant<'a> {
    pub fn unit_name(&self) -> Name {
        Name(name8_at(self.0, 0))
    }
    pub fn unit_number(&self) -> i16 {
        i16_at(self.0, 8)
    }
    pub fn file_number(&self) -> u8 {
        self.0[10]
    }
    pub fn unit_type(&self) -> u8 {
        self.0[11]
    }
    pub fn data_size(&self) -> i32 {
        i32_at(self.0, 12)
    }
}

view!(UnitLocationView);
impl<'a> UnitLocationView<'a> {
    pub fn n_units(&self) -> i16 {
        i16_at(self.0, 0)
    }
    pub fn variant(&self, index: usize) -> UnitLVariant<'a> {
        let start = 2 + index * 16;
        UnitLVariant(&self.0[start..start + 16])
    }
}

/// One entry of a `StringBlock`.
#[derive(Debug, Clone, Copy)]
pub struct StringVariant<'a>(&'a [u8]);
impl<'a> StringVariant<'a> {
    pub fn file_number(&self) -> i16 {
        i16_at(self.0, 0)
    }
    pub fn name_addr(&self) -> u32 {
        u32_at(self.0, 2)
    }
}

view!(StringBlockView);
impl<'a> StringBlockView<'a> {
    pub fn n_strings(&self) -> i16 {
        i16_at(self.0, 0)
    }
    pub fn variant(&self, index: usize) -> StringVariant<'a> {
        let start = 2 + index * 6;
        StringVariant(&self.0[start..start + 6])
    }
}

view!(PackedCodeView);
impl<'a> PackedCodeView<'a> {
    pub fn addr(&self) -> i32 {
        i32_at(self.0, 0)
    }

    /// Despite the name, this is the size of the *unpacked* code — the original dump routine
    /// allocates its unpack destination buffer from this field, not from `code`'s own length.
    pub fn csize(&self) -> i32 {
        i32_at(self.0, 4)
    }

    pub fn packed_code(&self) -> &'a [u8] {
        &self.0[8..]
    }
}

view!(PackTableView);
impl<'a> PackTableView<'a> {
    pub fn pack_version(&self) -> i32 {
        i32_at(self.0, 0)
    }
    /// The dictionary words, still in their on-disk big-endian byte order: the original swaps
    /// these lazily at lookup time rather than eagerly at parse time.
    pub fn raw_words(&self) -> &'a [u8] {
        &self.0[4..]
    }
    pub fn word_count(&self) -> usize {
        self.raw_words().len() / 2
    }
}

view!(OsDataView);
impl<'a> OsDataView<'a> {
    pub fn bitmap(&self) -> [u8; 16] {
        self.0[..16].try_into().unwrap()
    }
}

/// The decoded, kind-dispatched contents of a block, borrowed from the owning image.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    EofMark,
    ModuleName(ModuleNameView<'a>),
    EndBlock(EndBlockView<'a>),
    EntryPoint(EntryPointView<'a>),
    External(ExternalView<'a>),
    StartAddress(StartAddressView<'a>),
    CodeBlock(CodeBlockView<'a>),
    Relocation(RelocationView<'a>),
    CommonRelocation(CommonRelocationView<'a>),
    ShortExternal(ShortExternalView<'a>),
    /// Layout undocumented upstream; exposed only as raw bytes.
    OldExecutable(&'a [u8]),
    UnitBlock(UnitBlockView<'a>),
    /// Layout undocumented upstream; exposed only as raw bytes.
    PhysicalExec(&'a [u8]),
    Executable(ExecutableView<'a>),
    VersionCtrl(VersionCtrlView<'a>),
    SegmentTable(SegmentTableView<'a>),
    UnitTable(UnitTableView<'a>),
    SegLocation(SegLocationView<'a>),
    UnitLocation(UnitLocationView<'a>),
    StringBlock(StringBlockView<'a>),
    PackedCode(PackedCodeView<'a>),
    PackTable(PackTableView<'a>),
    OsData(OsDataView<'a>),
}

impl<'a> Payload<'a> {
    /// Decodes `payload` (the bytes strictly between a block's header and its end) according to
    /// `kind`. Callers must have already validated `payload.len()` against
    /// [`BlockKind::min_payload_len`](crate::tag::BlockKind::min_payload_len) and, for
    /// array-bearing kinds, that it divides evenly into whole entries.
    #[must_use]
    pub fn decode(kind: BlockKind, payload: &'a [u8]) -> Self {
        match kind {
            BlockKind::EOFMark => Self::EofMark,
            BlockKind::ModuleName => Self::ModuleName(ModuleNameView(payload)),
            BlockKind::EndBlock => Self::EndBlock(EndBlockView(payload)),
            BlockKind::EntryPoint => Self::EntryPoint(EntryPointView(payload)),
            BlockKind::External => Self::External(ExternalView(payload)),
            BlockKind::StartAddress => Self::StartAddress(StartAddressView(payload)),
            BlockKind::CodeBlock => Self::CodeBlock(CodeBlockView(payload)),
            BlockKind::Relocation => Self::Relocation(RelocationView(payload)),
            BlockKind::CommonRelocation => Self::CommonRelocation(CommonRelocationView(payload)),
            BlockKind::ShortExternal => Self::ShortExternal(ShortExternalView(payload)),
            BlockKind::OldExecutable => Self::OldExecutable(payload),
            BlockKind::UnitBlock => Self::UnitBlock(UnitBlockView(payload)),
            BlockKind::PhysicalExec => Self::PhysicalExec(payload),
            BlockKind::Executable => Self::Executable(ExecutableView(payload)),
            BlockKind::VersionCtrl => Self::VersionCtrl(VersionCtrlView(payload)),
            BlockKind::SegmentTable => Self::SegmentTable(SegmentTableView(payload)),
            BlockKind::UnitTable => Self::UnitTable(UnitTableView(payload)),
            BlockKind::SegLocation => Self::SegLocation(SegLocationView(payload)),
            BlockKind::UnitLocation => Self::UnitLocation(UnitLocationView(payload)),
            BlockKind::StringBlock => Self::StringBlock(StringBlockView(payload)),
            BlockKind::PackedCode => Self::PackedCode(PackedCodeView(payload)),
            BlockKind::PackTable => Self::PackTable(PackTableView(payload)),
            BlockKind::OSData => Self::OsData(OsDataView(payload)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_trims_at_first_space() {
        let name = Name(*b"MOD1    ");
        assert_eq!(name.trimmed(), "MOD1");
    }

    #[test]
    fn name_with_no_padding_is_kept_whole() {
        let name = Name(*b"ABCDEFGH");
        assert_eq!(name.trimmed(), "ABCDEFGH");
    }
}
