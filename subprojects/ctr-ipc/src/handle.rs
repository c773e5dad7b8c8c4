//! Kernel object handle types.
//!
//! Handles are opaque 32-bit references to kernel-managed objects. The codec
//! never interprets them; it only moves them through descriptor payloads.
//! Ownership semantics (duplicate on Copy, consume on Move) are enforced by
//! the handle-table collaborator during translation, not here.

/// Raw handle value as it appears in a command buffer word.
pub type RawHandle = u32;

/// Sentinel raw value for an invalid handle.
pub const INVALID_HANDLE: RawHandle = 0;

/// An opaque reference to a kernel object, valid within one process's
/// handle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Handle(RawHandle);

impl Handle {
    /// Converts a raw buffer word to a [`Handle`].
    ///
    /// The value is not checked against any handle table; an invalid raw
    /// value yields a handle for which [`is_valid`](Self::is_valid) is false
    /// or which the table will reject at use time.
    pub const fn from_raw(raw: RawHandle) -> Self {
        Self(raw)
    }

    /// Returns `true` if the handle is not the invalid sentinel.
    pub const fn is_valid(&self) -> bool {
        self.0 != INVALID_HANDLE
    }

    /// Converts the handle back to its raw buffer representation.
    pub const fn to_raw(&self) -> RawHandle {
        self.0
    }
}

impl PartialEq<RawHandle> for Handle {
    fn eq(&self, other: &RawHandle) -> bool {
        &self.0 == other
    }
}

/// Identifier of an emulated process, substituted into CallingPid
/// descriptor payloads during translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct ProcessId(u32);

impl ProcessId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(&self) -> u32 {
        self.0
    }
}
