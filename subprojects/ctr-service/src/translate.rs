//! Request translation.
//!
//! When a command buffer crosses an address-space boundary, every value in
//! its translate-parameter region has to be rewritten: handles re-minted in
//! the receiver's handle table, buffer addresses replaced with
//! receiver-visible ones, CallingPid placeholders filled with the sender's
//! process id. This module walks the descriptor stream and requests each
//! rewrite from the kernel collaborators behind [`TranslateContext`].
//!
//! The walk starts at the first word after the normal parameters and is
//! driven purely by the descriptor tags: each descriptor is followed by its
//! payload (N handle words, or one address word), and the scan advances past
//! the payload before classifying the next word. A buffer whose declared
//! `translate_params_size` does not cover a descriptor's payload is a
//! protocol error, reported as [`TranslateError::InvalidBuffer`] - never a
//! best-effort recovery and never a panic.
//!
//! Translation of a single descriptor is atomic as far as the buffer is
//! concerned: payload words are staged and written back only once every
//! handle or mapping operation succeeded. Receiver-side handles minted
//! before a mid-payload failure are closed again through the context.

use ctr_ipc::{
    buffer::{COMMAND_BUFFER_WORDS, CommandBuffer},
    descriptor::{
        DescriptorType, MAX_HANDLES_PER_DESC, MappedBufferDescInfo, MappedBufferPermissions,
        PxiBufferDescInfo, StaticBufferDescInfo, descriptor_type, handle_count_from_desc,
    },
    handle::{Handle, INVALID_HANDLE},
    header::Header,
};

use crate::result::{ResultCode, ToResultCode};

/// Error produced while translating a command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// The declared translate-parameter region is inconsistent with the
    /// descriptor stream or exceeds the buffer capacity.
    #[error("translate region inconsistent with descriptor stream")]
    InvalidBuffer,
    /// The handle table rejected a handle in a descriptor payload.
    #[error("invalid handle")]
    InvalidHandle,
    /// The receiver is not allowed to access the described memory.
    #[error("permission denied")]
    PermissionDenied,
    /// A shared mapping or buffer copy could not be established.
    #[error("mapping failed")]
    MappingFailed,
}

impl ToResultCode for TranslateError {
    fn to_rc(self) -> ResultCode {
        match self {
            Self::InvalidBuffer => ResultCode::ERR_INVALID_DESCRIPTOR,
            Self::InvalidHandle => ResultCode::ERR_INVALID_HANDLE,
            Self::PermissionDenied => ResultCode::ERR_PERMISSION_DENIED,
            Self::MappingFailed => ResultCode::ERR_MAPPING_FAILED,
        }
    }
}

/// Kernel collaborators for one translation direction (sender → receiver).
///
/// The handle table and address space are owned by the environment; this
/// trait is the contract the translator programs against. Implementations
/// decide whether buffer translation copies bytes or aliases pages, but they
/// must honor the protocol's contracts:
///
/// - [`duplicate_handle`](Self::duplicate_handle) leaves the sender's
///   reference valid and returns an independent receiver reference.
/// - [`transfer_handle`](Self::transfer_handle) consumes the sender's
///   reference; afterwards the object is reachable only through the returned
///   receiver handle. The transfer must be atomic with respect to concurrent
///   handle-table access.
/// - Static and PXI buffer translation must make receiver writes into
///   designated output buffers visible to the sender (bidirectional copy
///   contract).
/// - Mapped-buffer translation must enforce the requested permissions;
///   read-only mappings reject receiver writes. The mapping's lifetime is
///   scoped to the request unless the service extends it explicitly.
pub trait TranslateContext {
    /// Process id of the sending process for this direction.
    fn sender_pid(&self) -> ctr_ipc::ProcessId;

    /// Duplicates a handle into the receiver's handle table.
    fn duplicate_handle(&mut self, handle: Handle) -> Result<Handle, TranslateError>;

    /// Moves a handle into the receiver's handle table, invalidating the
    /// sender's reference.
    fn transfer_handle(&mut self, handle: Handle) -> Result<Handle, TranslateError>;

    /// Closes a receiver-side handle minted earlier in this translation.
    /// Used to undo a partially translated descriptor payload.
    fn close_handle(&mut self, handle: Handle);

    /// Makes the sender's static buffer at `addr` (`size` bytes, slot
    /// `buffer_id`) visible to the receiver; returns the receiver-visible
    /// address.
    fn translate_static_buffer(
        &mut self,
        addr: u32,
        size: u32,
        buffer_id: u8,
    ) -> Result<u32, TranslateError>;

    /// Translates a PXI buffer's physical-address-table reference; returns
    /// the receiver-visible reference.
    fn translate_pxi_buffer(
        &mut self,
        addr: u32,
        size: u32,
        buffer_id: u8,
        read_only: bool,
    ) -> Result<u32, TranslateError>;

    /// Establishes a shared mapping of `size` bytes with the given access
    /// rights; returns the receiver-side address of the mapping.
    fn map_buffer(
        &mut self,
        addr: u32,
        size: u32,
        perms: MappedBufferPermissions,
    ) -> Result<u32, TranslateError>;
}

/// Translates the translate-parameter region of `buffer` in place.
///
/// Walks the descriptor stream after the normal parameters, rewriting each
/// descriptor's payload from sender semantics to receiver semantics. On
/// error the region is left with every fully translated descriptor applied
/// and the failing descriptor's payload untouched.
pub fn translate_command_buffer(
    buffer: &mut CommandBuffer,
    ctx: &mut dyn TranslateContext,
) -> Result<(), TranslateError> {
    let header = validate_header(buffer.header())?;
    let mut idx = 1 + header.normal_params() as usize;
    let end = idx + header.translate_params_size() as usize;

    while idx < end {
        let desc = buffer[idx];
        idx += 1;

        match descriptor_type(desc) {
            kind @ (DescriptorType::CopyHandle | DescriptorType::MoveHandle) => {
                let count = handle_count_from_desc(desc) as usize;
                if idx + count > end {
                    return Err(TranslateError::InvalidBuffer);
                }
                translate_handles(buffer, idx, count, kind == DescriptorType::MoveHandle, ctx)?;
                idx += count;
            }
            DescriptorType::CallingPid => {
                if idx >= end {
                    return Err(TranslateError::InvalidBuffer);
                }
                buffer[idx] = ctx.sender_pid().to_raw();
                idx += 1;
            }
            DescriptorType::StaticBuffer => {
                if idx >= end {
                    return Err(TranslateError::InvalidBuffer);
                }
                let info = StaticBufferDescInfo::from_raw(desc);
                buffer[idx] =
                    ctx.translate_static_buffer(buffer[idx], info.size(), info.buffer_id())?;
                idx += 1;
            }
            DescriptorType::PxiBuffer => {
                if idx >= end {
                    return Err(TranslateError::InvalidBuffer);
                }
                let info = PxiBufferDescInfo::from_raw(desc);
                buffer[idx] = ctx.translate_pxi_buffer(
                    buffer[idx],
                    info.size(),
                    info.buffer_id(),
                    info.read_only(),
                )?;
                idx += 1;
            }
            DescriptorType::MappedBuffer => {
                if idx >= end {
                    return Err(TranslateError::InvalidBuffer);
                }
                let info = MappedBufferDescInfo::from_raw(desc);
                buffer[idx] = ctx.map_buffer(buffer[idx], info.size(), info.perms())?;
                idx += 1;
            }
        }
    }

    Ok(())
}

/// Returns the parsed header if its declared regions fit the buffer.
/// [`translate_command_buffer`] runs this before walking the descriptor
/// stream.
pub fn validate_header(header: Header) -> Result<Header, TranslateError> {
    let total = 1 + header.normal_params() as usize + header.translate_params_size() as usize;
    if total > COMMAND_BUFFER_WORDS {
        return Err(TranslateError::InvalidBuffer);
    }
    Ok(header)
}

/// Translates the `count` handle words starting at `start`.
///
/// All handles are staged before any buffer word is rewritten. If the handle
/// table rejects one, the receiver handles minted so far are closed and the
/// payload is left as the sender wrote it.
fn translate_handles(
    buffer: &mut CommandBuffer,
    start: usize,
    count: usize,
    is_move: bool,
    ctx: &mut dyn TranslateContext,
) -> Result<(), TranslateError> {
    let mut staged = [Handle::from_raw(INVALID_HANDLE); MAX_HANDLES_PER_DESC as usize];

    for i in 0..count {
        let handle = Handle::from_raw(buffer[start + i]);
        let translated = if is_move {
            ctx.transfer_handle(handle)
        } else {
            ctx.duplicate_handle(handle)
        };

        match translated {
            Ok(receiver_handle) => staged[i] = receiver_handle,
            Err(err) => {
                for minted in &staged[..i] {
                    ctx.close_handle(*minted);
                }
                return Err(err);
            }
        }
    }

    for i in 0..count {
        buffer[start + i] = staged[i].to_raw();
    }
    Ok(())
}
