//! The closed set of block tags a Lisa object file can contain, and the one enumerated field
//! (`UnitType`) that appears inside a couple of block payloads.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Byte offset within an `External`/`ShortExternal` payload where the trailing reference array
/// begins, counting the 4-byte block header as part of the offset.
///
/// The real Lisa linker source computes `External`'s `Ref[]` count as `(size-12)/4`, which only
/// matches a single 8-byte name preceding the array. Its own struct declares two 8-byte names
/// (`LinkName`, `UserName`) before `Ref[]`, which implies `(size-20)/4`. This crate implements the
/// latter; see `DESIGN.md`.
pub const EXTERNAL_FIXED_HEADER_LEN: usize = 20;

/// Every block tag a Lisa object/executable file can contain.
///
/// 22 of these carry a payload; `EOFMark` is the empty terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BlockKind {
    EOFMark = 0x00,
    ModuleName = 0x80,
    EndBlock = 0x81,
    EntryPoint = 0x82,
    External = 0x83,
    StartAddress = 0x84,
    CodeBlock = 0x85,
    Relocation = 0x86,
    CommonRelocation = 0x87,
    ShortExternal = 0x89,
    OldExecutable = 0x8F,
    UnitBlock = 0x92,
    PhysicalExec = 0x97,
    Executable = 0x98,
    VersionCtrl = 0x99,
    SegmentTable = 0x9A,
    UnitTable = 0x9B,
    SegLocation = 0x9C,
    UnitLocation = 0x9D,
    StringBlock = 0x9E,
    PackedCode = 0xA0,
    PackTable = 0xA1,
    OSData = 0xB2,
}

impl BlockKind {
    /// The name used in block dumps, matching the original tool's block-type-to-string mapping.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EOFMark => "EOFMark",
            Self::ModuleName => "ModuleName",
            Self::EndBlock => "EndBlock",
            Self::EntryPoint => "EntryPoint",
            Self::External => "External",
            Self::StartAddress => "StartAddress",
            Self::CodeBlock => "CodeBlock",
            Self::Relocation => "Relocation",
            Self::CommonRelocation => "CommonRelocation",
            Self::ShortExternal => "ShortExternal",
            Self::OldExecutable => "OldExecutable",
            Self::UnitBlock => "UnitBlock",
            Self::PhysicalExec => "PhysicalExec",
            Self::Executable => "Executable",
            Self::VersionCtrl => "VersionCtrl",
            Self::SegmentTable => "SegmentTable",
            Self::UnitTable => "UnitTable",
            Self::SegLocation => "SegLocation",
            Self::UnitLocation => "UnitLocation",
            Self::StringBlock => "StringBlock",
            Self::PackedCode => "PackedCode",
            Self::PackTable => "PackTable",
            Self::OSData => "OSData",
        }
    }

    /// The minimum payload length (bytes after the 4-byte header) a block of this kind can have.
    /// Kinds with a trailing variable-length array report the length of their fixed part only;
    /// the array itself must additionally divide evenly into whatever payload remains.
    #[must_use]
    pub const fn min_payload_len(self) -> usize {
        match self {
            Self::EOFMark => 0,
            Self::ModuleName => 20,
            Self::EndBlock => 4,
            Self::EntryPoint => 20,
            Self::External => 16,
            Self::StartAddress => 8,
            Self::CodeBlock => 4,
            Self::Relocation => 0,
            Self::CommonRelocation => 8,
            Self::ShortExternal => 16,
            Self::OldExecutable | Self::PhysicalExec | Self::OSData => 0,
            Self::UnitBlock => 26,
            // Ten 32-bit header fields plus the two inner tables' 16-bit counts.
            Self::Executable => 44,
            Self::VersionCtrl => 24,
            Self::SegmentTable => 2,
            Self::UnitTable => 4,
            Self::SegLocation => 2,
            Self::UnitLocation => 2,
            Self::StringBlock => 2,
            Self::PackedCode => 8,
            Self::PackTable => 4,
        }
    }

    /// Size, in bytes, of one entry of this kind's trailing variable-length array (0 for kinds
    /// with no such array, or whose array element width is handled specially, like `OSData`'s
    /// fixed 16-byte bitmap which has no "count").
    #[must_use]
    pub const fn entry_len(self) -> usize {
        match self {
            Self::External | Self::Relocation | Self::CommonRelocation => 4,
            Self::ShortExternal => 2,
            Self::SegmentTable => 18,
            Self::UnitTable => 12,
            Self::SegLocation => 28,
            Self::UnitLocation => 16,
            Self::StringBlock => 6,
            _ => 0,
        }
    }
}

/// Renders a tag byte that falls outside the closed set, the way the original taxonomy's
/// `Unknown($xx)` fallback does.
#[must_use]
pub fn unknown_tag_name(tag: u8) -> String {
    format!("Unknown(${tag:02X})")
}

/// A Lisa unit's kind, stored as a 16-bit field inside `UnitBlock` and `UnitTable` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i16)]
pub enum UnitType {
    Regular = 0,
    Intrinsic = 1,
    Shared = 2,
}

impl UnitType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Intrinsic => "Intrinsic",
            Self::Shared => "Shared",
        }
    }
}

/// Renders a raw unit-type value outside {0,1,2} the way the original's fallback string does.
#[must_use]
pub fn unit_type_name(raw: i16) -> String {
    match UnitType::try_from(raw) {
        Ok(kind) => kind.name().to_string(),
        Err(_) => format!("Unknown(${raw:04X})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_real_c_tag_value_round_trips() {
        let tags = [
            0x00u8, 0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x89, 0x8F, 0x92, 0x97, 0x98,
            0x99, 0x9A, 0x9B, 0x9C, 0x9D, 0x9E, 0xA0, 0xA1, 0xB2,
        ];
        assert_eq!(tags.len(), 23);
        for tag in tags {
            let kind = BlockKind::try_from(tag).expect("tag should be in the closed set");
            assert_eq!(u8::from(kind), tag);
        }
    }

    #[test]
    fn unrecognized_tag_is_rejected() {
        assert!(BlockKind::try_from(0x01u8).is_err());
    }

    #[test]
    fn unit_type_renders_unknown_fallback() {
        assert_eq!(unit_type_name(0), "Regular");
        assert_eq!(unit_type_name(99), "Unknown($0063)");
    }
}
