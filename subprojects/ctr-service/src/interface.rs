//! Service interfaces and command dispatch.
//!
//! A service exposes a port and a table of command handlers keyed by the
//! 16-bit command id carried in the request header. The table is populated
//! once at service startup and immutable afterwards, which makes concurrent
//! lookup from multiple sessions safe without locking.
//!
//! Dispatch never faults on untrusted input: a command id missing from the
//! table is logged and answered with a defined error code, leaving the
//! session usable for subsequent requests.

use alloc::vec::Vec;

use modular_bitfield::prelude::*;

use crate::{
    port_name::PortName,
    result::ResultCode,
    session::{SessionRequest, SessionRequestHandler},
};

/// Default maximum number of simultaneous connections to a service port.
pub const DEFAULT_MAX_SESSIONS: u32 = 10;

/// Handler signature for one command: service state plus the translated
/// request, returning the result code written back to the client.
pub type Function<S> = fn(&mut S, &mut SessionRequest<'_>) -> ResultCode;

/// One entry of a service's function table.
#[derive(Debug)]
pub struct FunctionInfo<S> {
    /// Command id this handler answers.
    pub id: u32,
    /// Handler function.
    pub func: Function<S>,
    /// Human-readable command name, used in dispatch logging.
    pub name: &'static str,
}

impl<S> Clone for FunctionInfo<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for FunctionInfo<S> {}

/// Error returned when registering a function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    /// The command id is already present in the table. Registration is
    /// strict; silently overwriting an existing handler hides wiring bugs.
    #[error("duplicate command id {id:#x}")]
    DuplicateCommand { id: u32 },
}

/// Service version, four 8-bit subfields packed into a word.
#[bitfield]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Version {
    pub major: B8,
    pub minor: B8,
    pub build: B8,
    pub revision: B8,
}

impl Version {
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bytes(raw.to_le_bytes())
    }

    pub fn to_raw(self) -> u32 {
        u32::from_le_bytes(self.into_bytes())
    }
}

/// A service interface: port identity, version, session limit and the
/// command-id-to-handler table, plus the service's own state `S`.
pub struct Interface<S> {
    port_name: PortName,
    version: Version,
    max_sessions: u32,
    /// Sorted by command id; immutable after registration.
    functions: Vec<FunctionInfo<S>>,
    state: S,
}

impl<S> Interface<S> {
    /// Creates an interface for `port_name` with an empty function table and
    /// the default session limit.
    pub fn new(port_name: PortName, state: S) -> Self {
        Self {
            port_name,
            version: Version::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            functions: Vec::new(),
            state,
        }
    }

    /// Inserts `functions` into the table, keeping it sorted by command id.
    ///
    /// Registration is all-or-nothing: a duplicate id, within `functions` or
    /// against earlier registrations, fails the whole call and leaves the
    /// table unchanged.
    pub fn register(&mut self, functions: &[FunctionInfo<S>]) -> Result<(), RegisterError> {
        for (i, info) in functions.iter().enumerate() {
            if self.functions.binary_search_by_key(&info.id, |e| e.id).is_ok()
                || functions[..i].iter().any(|earlier| earlier.id == info.id)
            {
                return Err(RegisterError::DuplicateCommand { id: info.id });
            }
        }
        for info in functions {
            // The pre-scan guarantees the id is absent.
            if let Err(pos) = self.functions.binary_search_by_key(&info.id, |e| e.id) {
                self.functions.insert(pos, *info);
            }
        }
        Ok(())
    }

    /// Looks up the handler for a command id.
    pub fn function(&self, id: u32) -> Option<&FunctionInfo<S>> {
        self.functions
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|pos| &self.functions[pos])
    }

    pub fn port_name(&self) -> PortName {
        self.port_name
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Sets the version reported by the service from its packed form.
    pub fn set_version(&mut self, raw: u32) {
        self.version = Version::from_raw(raw);
    }

    /// Maximum simultaneous client connections to this port. Connection
    /// admission itself is enforced by the session/port layer upstream.
    pub fn max_sessions(&self) -> u32 {
        self.max_sessions
    }

    /// Tightens (or raises) the session limit for this service.
    pub fn set_max_sessions(&mut self, max_sessions: u32) {
        self.max_sessions = max_sessions;
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

impl<S> SessionRequestHandler for Interface<S> {
    /// Dispatches an already-translated request by command id.
    ///
    /// An unknown command id returns
    /// [`ResultCode::ERR_UNKNOWN_COMMAND`] without invoking any handler and
    /// without touching the buffer.
    fn handle_sync_request_impl(&mut self, request: &mut SessionRequest<'_>) -> ResultCode {
        let header = request.buffer.header();
        let id = u32::from(header.command_id());

        let Some(info) = self.function(id).copied() else {
            log::warn!(
                "{}: unknown command {:#06x} (header {:#010x})",
                self.port_name,
                id,
                header.to_raw(),
            );
            return ResultCode::ERR_UNKNOWN_COMMAND;
        };

        log::trace!("{}: dispatching {} ({:#06x})", self.port_name, info.name, id);
        (info.func)(&mut self.state, request)
    }
}
