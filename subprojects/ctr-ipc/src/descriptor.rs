//! Translate descriptor codec.
//!
//! Every entry in the translate-parameter region starts with a tagged 32-bit
//! descriptor word. The low four bits select the primary kind, but the tag
//! space overlaps, so classification is priority-ordered rather than a plain
//! match:
//!
//! 1. `bits[3:0] == 0` - handle descriptor; bits 4-5 select Copy (0x00),
//!    Move (0x10) or CallingPid (0x20).
//! 2. bit 3 (`0x08`) set - mapped buffer descriptor.
//! 3. bit 2 (`0x04`) set - PXI buffer descriptor.
//! 4. otherwise - static buffer descriptor.
//!
//! Reordering these checks misclassifies words: a mapped-buffer descriptor
//! with write permission has the PXI bit set too, and a PXI descriptor's
//! read-only flag lives on the static-buffer tag bit.
//!
//! # Descriptor Layouts
//!
//! ```text
//! Handle:  bits[5:4] kind, bits[31:26] handle count - 1
//!          payload: N handle words
//! Static:  bits[3:0] = 0x02, bits[13:10] buffer_id, bits[31:14] size
//!          payload: one address word
//! PXI:     bit 2 set, bit 1 read_only, bits[7:4] buffer_id, bits[31:8] size
//!          payload: one physical-address-table word
//! Mapped:  bit 3 set, bits[2:1] permissions, bits[31:4] size
//!          payload: one address word
//! ```
//!
//! Builders mask out-of-range inputs (`buffer_id & 0xF`, counts to 6 bits)
//! instead of failing; the wire format has no room for anything else and
//! callers own range validity. Parsers are non-failing bit extractions.

use bitflags::bitflags;
use modular_bitfield::prelude::*;
use static_assertions::const_assert_eq;

/// Tag bit selecting a static buffer descriptor.
pub const STATIC_BUFFER_BIT: u32 = 0x02;
/// Tag bit selecting a PXI buffer descriptor.
pub const PXI_BUFFER_BIT: u32 = 0x04;
/// Tag bit selecting a mapped buffer descriptor.
pub const MAPPED_BUFFER_BIT: u32 = 0x08;

const MOVE_HANDLE_BIT: u32 = 0x10;
const CALLING_PID_BIT: u32 = 0x20;

/// Maximum number of handles one handle descriptor can carry.
pub const MAX_HANDLES_PER_DESC: u32 = 64;

/// Primary kind of a translate descriptor word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    /// Duplicate the following handles; sender keeps its references.
    CopyHandle,
    /// Transfer ownership of the following handles to the receiver.
    MoveHandle,
    /// Overwrite the following word with the sender's process id.
    CallingPid,
    /// Read-only buffer owned by the sender, addressed by the next word.
    StaticBuffer,
    /// Buffer sent over PXI via a physical-address table.
    PxiBuffer,
    /// Range to be mapped into the receiver with explicit permissions.
    MappedBuffer,
}

bitflags! {
    /// Access rights requested by a mapped buffer descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MappedBufferPermissions: u32 {
        const R = 1;
        const W = 2;
        const RW = Self::R.bits() | Self::W.bits();
    }
}

/// Classifies a raw word into its descriptor kind.
///
/// Total over `u32`, and the checks run in the priority order documented at
/// the module level. A handle word with both the Move and CallingPid bits
/// set classifies as CallingPid; the protocol never emits that pattern, but
/// classification must still return exactly one kind.
pub const fn descriptor_type(word: u32) -> DescriptorType {
    if word & 0xF == 0 {
        if word & CALLING_PID_BIT != 0 {
            DescriptorType::CallingPid
        } else if word & MOVE_HANDLE_BIT != 0 {
            DescriptorType::MoveHandle
        } else {
            DescriptorType::CopyHandle
        }
    } else if word & MAPPED_BUFFER_BIT != 0 {
        DescriptorType::MappedBuffer
    } else if word & PXI_BUFFER_BIT != 0 {
        DescriptorType::PxiBuffer
    } else {
        DescriptorType::StaticBuffer
    }
}

/// Packs a Move handle descriptor carrying `count` handles (1-64).
///
/// The count is encoded as `count - 1` in six bits; out-of-range counts wrap
/// silently.
pub const fn make_move_handles_desc(count: u32) -> u32 {
    MOVE_HANDLE_BIT | ((count.wrapping_sub(1) & 0x3F) << 26)
}

/// Packs a Copy handle descriptor carrying `count` handles (1-64).
pub const fn make_copy_handles_desc(count: u32) -> u32 {
    (count.wrapping_sub(1) & 0x3F) << 26
}

/// Packs a CallingPid descriptor. The following word is replaced with the
/// sender's process id during translation.
pub const fn make_calling_pid_desc() -> u32 {
    CALLING_PID_BIT
}

/// Decodes the handle count of a handle descriptor.
///
/// Only meaningful when [`descriptor_type`] returned a handle kind.
pub const fn handle_count_from_desc(desc: u32) -> u32 {
    (desc >> 26) + 1
}

/// Packs a static buffer descriptor. `size` is limited to 18 bits,
/// `buffer_id` is masked to 4 bits.
pub const fn make_static_buffer_desc(size: u32, buffer_id: u8) -> u32 {
    STATIC_BUFFER_BIT | (size << 14) | (((buffer_id & 0xF) as u32) << 10)
}

/// Packs a PXI buffer descriptor. `size` is limited to 0x00FFFFFF,
/// `buffer_id` is masked to 4 bits. The payload word is a physical address
/// of a page table in the BASE memory region.
pub const fn make_pxi_buffer_desc(size: u32, buffer_id: u8, read_only: bool) -> u32 {
    let ro = if read_only { 0x2 } else { 0 };
    PXI_BUFFER_BIT | ro | (size << 8) | (((buffer_id & 0xF) as u32) << 4)
}

/// Packs a mapped buffer descriptor. `size` is limited to 28 bits.
pub const fn make_mapped_buffer_desc(size: u32, perms: MappedBufferPermissions) -> u32 {
    MAPPED_BUFFER_BIT | (size << 4) | (perms.bits() << 1)
}

/// Parsed fields of a static buffer descriptor.
#[bitfield]
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct StaticBufferDescInfo {
    #[skip]
    __: B10,
    /// Slot in the receiver's static-buffer table.
    pub buffer_id: B4,
    /// Buffer size in bytes.
    pub size: B18,
}

const_assert_eq!(size_of::<StaticBufferDescInfo>(), size_of::<u32>());

impl StaticBufferDescInfo {
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }
}

/// Parsed fields of a PXI buffer descriptor.
#[bitfield]
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct PxiBufferDescInfo {
    #[skip]
    __: B1,
    /// If set, the receiver may only read the buffer.
    pub read_only: bool,
    #[skip]
    __: B2,
    /// Slot identifying the buffer to the PXI peer.
    pub buffer_id: B4,
    /// Buffer size in bytes.
    pub size: B24,
}

const_assert_eq!(size_of::<PxiBufferDescInfo>(), size_of::<u32>());

impl PxiBufferDescInfo {
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }
}

/// Parsed fields of a mapped buffer descriptor.
#[bitfield]
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct MappedBufferDescInfo {
    #[skip]
    __: B1,
    /// Raw permission bits; see [`MappedBufferDescInfo::perms`].
    pub perms_bits: B2,
    #[skip]
    __: B1,
    /// Mapping size in bytes.
    pub size: B28,
}

const_assert_eq!(size_of::<MappedBufferDescInfo>(), size_of::<u32>());

impl MappedBufferDescInfo {
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }

    /// Decoded access rights of the mapping.
    pub fn perms(&self) -> MappedBufferPermissions {
        MappedBufferPermissions::from_bits_truncate(self.perms_bits() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_count_round_trip() {
        for count in 1..=MAX_HANDLES_PER_DESC {
            let move_desc = make_move_handles_desc(count);
            let copy_desc = make_copy_handles_desc(count);
            assert_eq!(handle_count_from_desc(move_desc), count);
            assert_eq!(handle_count_from_desc(copy_desc), count);
            assert_eq!(descriptor_type(move_desc), DescriptorType::MoveHandle);
            assert_eq!(descriptor_type(copy_desc), DescriptorType::CopyHandle);
        }
    }

    #[test]
    fn test_known_handle_encodings() {
        assert_eq!(make_copy_handles_desc(1), 0x0000_0000);
        assert_eq!(make_move_handles_desc(2), 0x0400_0010);
        assert_eq!(make_calling_pid_desc(), 0x0000_0020);
    }

    #[test]
    fn test_static_buffer_round_trip() {
        let desc = make_static_buffer_desc(0x2_0000, 0x3);
        assert_eq!(descriptor_type(desc), DescriptorType::StaticBuffer);

        let info = StaticBufferDescInfo::from_raw(desc);
        assert_eq!(info.size(), 0x2_0000);
        assert_eq!(info.buffer_id(), 0x3);
    }

    #[test]
    fn test_static_buffer_id_masked() {
        // buffer_id is a 4-bit field; 0x1A masks to 0xA.
        let info = StaticBufferDescInfo::from_raw(make_static_buffer_desc(0x40, 0x1A));
        assert_eq!(info.buffer_id(), 0xA);
    }

    #[test]
    fn test_pxi_buffer_round_trip() {
        let desc = make_pxi_buffer_desc(0x00AB_CDEF, 0x5, true);
        assert_eq!(descriptor_type(desc), DescriptorType::PxiBuffer);

        let info = PxiBufferDescInfo::from_raw(desc);
        assert_eq!(info.size(), 0x00AB_CDEF);
        assert_eq!(info.buffer_id(), 0x5);
        assert!(info.read_only());

        let rw = PxiBufferDescInfo::from_raw(make_pxi_buffer_desc(0x100, 0x5, false));
        assert!(!rw.read_only());
    }

    #[test]
    fn test_mapped_buffer_round_trip() {
        let desc = make_mapped_buffer_desc(0x1000, MappedBufferPermissions::RW);
        assert_eq!(desc, 0x0001_000E);
        assert_eq!(descriptor_type(desc), DescriptorType::MappedBuffer);

        let info = MappedBufferDescInfo::from_raw(desc);
        assert_eq!(info.size(), 0x1000);
        assert_eq!(info.perms(), MappedBufferPermissions::RW);

        let ro = MappedBufferDescInfo::from_raw(make_mapped_buffer_desc(
            0x0FFF_FFFF,
            MappedBufferPermissions::R,
        ));
        assert_eq!(ro.size(), 0x0FFF_FFFF);
        assert_eq!(ro.perms(), MappedBufferPermissions::R);
    }

    #[test]
    fn test_classification_priority() {
        // The tag bits overlap; the mapped-buffer check must win over the
        // PXI check, and both over static.
        assert_eq!(
            descriptor_type(MAPPED_BUFFER_BIT | PXI_BUFFER_BIT),
            DescriptorType::MappedBuffer
        );
        assert_eq!(
            descriptor_type(MAPPED_BUFFER_BIT | STATIC_BUFFER_BIT),
            DescriptorType::MappedBuffer
        );
        assert_eq!(
            descriptor_type(PXI_BUFFER_BIT | STATIC_BUFFER_BIT),
            DescriptorType::PxiBuffer
        );
        assert_eq!(descriptor_type(STATIC_BUFFER_BIT), DescriptorType::StaticBuffer);

        // A PXI descriptor with the read-only flag still has only the PXI
        // tag bit relevant for classification.
        assert_eq!(
            descriptor_type(make_pxi_buffer_desc(0x10, 0, true)),
            DescriptorType::PxiBuffer
        );

        // Handle classification runs before any buffer bit check: all-zero
        // low nibble means handle kind no matter what the upper bits say.
        assert_eq!(
            descriptor_type(0xFFC0_0000),
            DescriptorType::CopyHandle
        );
        assert_eq!(descriptor_type(0x30), DescriptorType::CallingPid);
    }

    #[test]
    fn test_classification_total() {
        // Spot-check a spread of words; every one classifies to exactly one
        // kind without panicking.
        let mut word = 0u32;
        while word < 0x100 {
            let _ = descriptor_type(word);
            word += 1;
        }
        let _ = descriptor_type(u32::MAX);
    }
}
