//! Session request handling.
//!
//! [`SessionRequestHandler`] is the seam between the kernel's session
//! machinery and a service implementation: the kernel delivers one sync
//! request at a time through [`handle_sync_request`], which translates the
//! inbound buffer, runs the service's own
//! [`handle_sync_request_impl`], and translates the response buffer back
//! toward the client before returning.
//!
//! Different sessions of the same service may be driven concurrently from
//! different execution contexts; a single session's requests are serialized
//! by its connecting thread, so the handler need not be reentrant per
//! session.
//!
//! [`handle_sync_request`]: SessionRequestHandler::handle_sync_request
//! [`handle_sync_request_impl`]: SessionRequestHandler::handle_sync_request_impl

use ctr_ipc::buffer::CommandBuffer;

use crate::{
    result::{ResultCode, ToResultCode},
    translate::{TranslateContext, translate_command_buffer},
};

/// Identity of the server session a request arrived on, used to key
/// session-scoped service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SessionId(u32);

impl SessionId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(&self) -> u32 {
        self.0
    }
}

/// One in-flight sync request: the originating session and the command
/// buffer, exclusively owned by the calling context until the handler
/// returns.
pub struct SessionRequest<'a> {
    pub session: SessionId,
    pub buffer: &'a mut CommandBuffer,
}

/// Per-request kernel collaborator providing the two translation
/// directions: client→server for the request, server→client for the
/// response.
pub trait SyncContext {
    /// Translate context for the inbound (request) direction.
    fn request(&mut self) -> &mut dyn TranslateContext;

    /// Translate context for the outbound (response) direction.
    fn response(&mut self) -> &mut dyn TranslateContext;
}

/// Implemented by anything that can answer sync requests on a session;
/// service interfaces implement it via their function tables.
pub trait SessionRequestHandler {
    /// Handles a translated request and writes the response header,
    /// parameters and descriptors into the buffer.
    fn handle_sync_request_impl(&mut self, request: &mut SessionRequest<'_>) -> ResultCode;

    /// Single entry point the kernel uses to deliver a sync request.
    ///
    /// Translates the inbound buffer, dispatches, then translates the
    /// outbound buffer. A translation failure on the way in aborts the
    /// request before dispatch and surfaces as the returned result code; the
    /// session stays usable.
    fn handle_sync_request(
        &mut self,
        request: &mut SessionRequest<'_>,
        ctx: &mut dyn SyncContext,
    ) -> ResultCode {
        if let Err(err) = translate_command_buffer(request.buffer, ctx.request()) {
            log::warn!(
                "request translation failed on session {}: {err}",
                request.session.to_raw()
            );
            return err.to_rc();
        }

        let rc = self.handle_sync_request_impl(request);

        if let Err(err) = translate_command_buffer(request.buffer, ctx.response()) {
            log::warn!(
                "response translation failed on session {}: {err}",
                request.session.to_raw()
            );
            return err.to_rc();
        }

        rc
    }
}

#[cfg(test)]
mod tests {
    use ctr_ipc::{
        Handle, ProcessId,
        descriptor::{MappedBufferPermissions, make_copy_handles_desc, make_move_handles_desc},
        header::make_header,
    };

    use super::*;
    use crate::{
        interface::{FunctionInfo, Interface},
        port_name::PortName,
        translate::TranslateError,
    };

    /// Two-direction kernel stub; tracks which direction each handle
    /// operation ran in.
    #[derive(Default)]
    struct TwoWayKernel {
        outbound: bool,
        request_ops: u32,
        response_ops: u32,
        next_handle: u32,
    }

    impl TranslateContext for TwoWayKernel {
        fn sender_pid(&self) -> ProcessId {
            ProcessId::new(if self.outbound { 2 } else { 1 })
        }

        fn duplicate_handle(&mut self, _handle: Handle) -> Result<Handle, TranslateError> {
            if self.outbound {
                self.response_ops += 1;
            } else {
                self.request_ops += 1;
            }
            self.next_handle += 1;
            Ok(Handle::from_raw(0x1000 + self.next_handle))
        }

        fn transfer_handle(&mut self, handle: Handle) -> Result<Handle, TranslateError> {
            self.duplicate_handle(handle)
        }

        fn close_handle(&mut self, _handle: Handle) {}

        fn translate_static_buffer(
            &mut self,
            addr: u32,
            _size: u32,
            _buffer_id: u8,
        ) -> Result<u32, TranslateError> {
            Ok(addr)
        }

        fn translate_pxi_buffer(
            &mut self,
            addr: u32,
            _size: u32,
            _buffer_id: u8,
            _read_only: bool,
        ) -> Result<u32, TranslateError> {
            Ok(addr)
        }

        fn map_buffer(
            &mut self,
            addr: u32,
            _size: u32,
            _perms: MappedBufferPermissions,
        ) -> Result<u32, TranslateError> {
            Ok(addr)
        }
    }

    impl SyncContext for TwoWayKernel {
        fn request(&mut self) -> &mut dyn TranslateContext {
            self.outbound = false;
            self
        }

        fn response(&mut self) -> &mut dyn TranslateContext {
            self.outbound = true;
            self
        }
    }

    /// Echo command: answers with a moved handle in the response.
    fn cmd_echo_handle(_state: &mut (), request: &mut SessionRequest<'_>) -> ResultCode {
        let incoming = request.buffer[2];
        request.buffer.set_header(make_header(0x0001, 1, 2));
        request.buffer[1] = ResultCode::SUCCESS.to_raw();
        request.buffer[2] = make_move_handles_desc(1);
        request.buffer[3] = incoming;
        ResultCode::SUCCESS
    }

    #[test]
    fn test_round_trip_translates_both_directions() {
        let mut kernel = TwoWayKernel::default();
        let mut iface = Interface::new(PortName::new("tst:").unwrap(), ());
        iface
            .register(&[FunctionInfo { id: 0x0001, func: cmd_echo_handle, name: "EchoHandle" }])
            .unwrap();

        let mut buffer = ctr_ipc::CommandBuffer::new();
        buffer.set_header(make_header(0x0001, 0, 2));
        buffer[1] = make_copy_handles_desc(1);
        buffer[2] = 0x77;

        let mut request = SessionRequest {
            session: SessionId::new(9),
            buffer: &mut buffer,
        };
        let rc = iface.handle_sync_request(&mut request, &mut kernel);

        assert_eq!(rc, ResultCode::SUCCESS);
        assert_eq!(kernel.request_ops, 1, "inbound copy translated");
        assert_eq!(kernel.response_ops, 1, "outbound move translated");
        // The response buffer carries the re-minted handle, not the one the
        // handler wrote.
        assert_eq!(buffer[3], 0x1000 + 2);
    }

    #[test]
    fn test_inbound_failure_aborts_before_dispatch() {
        struct FailingKernel;

        impl SyncContext for FailingKernel {
            fn request(&mut self) -> &mut dyn TranslateContext {
                self
            }

            fn response(&mut self) -> &mut dyn TranslateContext {
                self
            }
        }

        impl TranslateContext for FailingKernel {
            fn sender_pid(&self) -> ProcessId {
                ProcessId::new(1)
            }

            fn duplicate_handle(&mut self, _handle: Handle) -> Result<Handle, TranslateError> {
                Err(TranslateError::InvalidHandle)
            }

            fn transfer_handle(&mut self, _handle: Handle) -> Result<Handle, TranslateError> {
                Err(TranslateError::InvalidHandle)
            }

            fn close_handle(&mut self, _handle: Handle) {}

            fn translate_static_buffer(
                &mut self,
                _addr: u32,
                _size: u32,
                _buffer_id: u8,
            ) -> Result<u32, TranslateError> {
                Err(TranslateError::PermissionDenied)
            }

            fn translate_pxi_buffer(
                &mut self,
                _addr: u32,
                _size: u32,
                _buffer_id: u8,
                _read_only: bool,
            ) -> Result<u32, TranslateError> {
                Err(TranslateError::PermissionDenied)
            }

            fn map_buffer(
                &mut self,
                _addr: u32,
                _size: u32,
                _perms: MappedBufferPermissions,
            ) -> Result<u32, TranslateError> {
                Err(TranslateError::MappingFailed)
            }
        }

        fn cmd_must_not_run(_state: &mut (), _request: &mut SessionRequest<'_>) -> ResultCode {
            panic!("handler must not be invoked when inbound translation fails");
        }

        let mut kernel = FailingKernel;
        let mut iface = Interface::new(PortName::new("tst:").unwrap(), ());
        iface
            .register(&[FunctionInfo { id: 0x0001, func: cmd_must_not_run, name: "MustNotRun" }])
            .unwrap();

        let mut buffer = ctr_ipc::CommandBuffer::new();
        buffer.set_header(make_header(0x0001, 0, 2));
        buffer[1] = make_copy_handles_desc(1);
        buffer[2] = 0x77;

        let mut request = SessionRequest {
            session: SessionId::new(3),
            buffer: &mut buffer,
        };
        let rc = iface.handle_sync_request(&mut request, &mut kernel);

        assert_eq!(rc, ResultCode::ERR_INVALID_HANDLE);
    }
}
