//! Command header codec.
//!
//! The first word of every command buffer packs the command id and the two
//! region sizes:
//!
//! ```text
//! Bits 0-5:   translate_params_size (words, including descriptor words)
//! Bits 6-11:  normal_params (words)
//! Bits 12-15: unused
//! Bits 16-31: command_id
//! ```
//!
//! Parsing is total: any 32-bit value is a syntactically valid header.
//! Whether `translate_params_size` matches the descriptor stream that
//! actually follows is checked by the request translator, not here.

use modular_bitfield::prelude::*;
use static_assertions::const_assert_eq;

/// Packs a command header word.
///
/// `normal_params` and `translate_params_size` are masked to 6 bits; values
/// above 63 are silently truncated, matching the wire protocol's fixed field
/// widths. Callers are responsible for staying in range.
pub const fn make_header(command_id: u16, normal_params: u32, translate_params_size: u32) -> u32 {
    ((command_id as u32) << 16) | ((normal_params & 0x3F) << 6) | (translate_params_size & 0x3F)
}

/// Parsed command header.
#[bitfield]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Header {
    /// Size of the translate-parameter region in words.
    pub translate_params_size: B6,
    /// Number of normal-parameter words.
    pub normal_params: B6,
    /// Unused bits.
    #[skip]
    __: B4,
    /// Command id dispatched on by the service's function table.
    pub command_id: B16,
}

const_assert_eq!(size_of::<Header>(), size_of::<u32>());

impl Header {
    /// Parses a raw header word. Total; no failure mode.
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }

    /// Converts the header back to its raw word representation.
    pub fn to_raw(self) -> u32 {
        u32::from_le_bytes(self.into_bytes())
    }
}
