//! Port name type for CTR OS services.
//!
//! Service port names are at most 8 characters ("srv:", "APT:U", "fs:USER"),
//! with unused bytes zero, so a whole name fits in one `u64`. Registry
//! lookups compare names as integers instead of chasing string allocations.

use static_assertions::const_assert_eq;

/// Fixed-capacity ASCII string naming a service port (max 8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(C)]
pub struct PortName {
    name: [u8; 8],
}

const_assert_eq!(size_of::<PortName>(), size_of::<u64>());

impl PortName {
    /// Maximum length of a port name (8 characters).
    pub const MAX_LEN: usize = 8;

    /// Creates a port name from a string slice.
    ///
    /// Returns `None` if the name exceeds 8 characters.
    ///
    /// # Panics
    ///
    /// Panics if the name contains non-ASCII characters.
    pub const fn new(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > Self::MAX_LEN {
            return None;
        }

        let mut result = [0u8; 8];
        let mut c = 0;
        while c < bytes.len() {
            assert!(bytes[c].is_ascii(), "port name must be ASCII");
            result[c] = bytes[c];
            c += 1;
        }
        Some(Self { name: result })
    }

    /// Converts the port name to a `u64` for efficient comparison.
    pub const fn to_u64(&self) -> u64 {
        u64::from_le_bytes(self.name)
    }

    /// Returns the bytes of the port name, excluding trailing zeros.
    pub const fn as_bytes(&self) -> &[u8] {
        let mut len = self.name.len();
        while len > 0 && self.name[len - 1] == 0 {
            len -= 1;
        }
        self.name.split_at(len).0
    }

    /// Returns the port name as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII.
        core::str::from_utf8(self.as_bytes()).unwrap_or("")
    }
}

impl core::fmt::Display for PortName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
