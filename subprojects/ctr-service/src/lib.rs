//! Service framework for CTR OS HLE IPC.
//!
//! This crate sits on top of the [`ctr_ipc`] wire codec and implements the
//! request-side machinery a high-level-emulated service needs:
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │  Service implementations         │  Command handlers
//! ├──────────────────────────────────┤
//! │  interface / session  ← here     │  Dispatch & orchestration
//! ├──────────────────────────────────┤
//! │  translate            ← here     │  Capability translation
//! ├──────────────────────────────────┤
//! │  ctr-ipc                         │  Header & descriptor codec
//! └──────────────────────────────────┘
//! ```
//!
//! An incoming sync request flows through
//! [`SessionRequestHandler::handle_sync_request`]: the translate-parameter
//! region of the command buffer is rewritten from the client's addressing
//! context into the server's, the service's function table dispatches on the
//! command id, and the response buffer is translated back before control
//! returns to the kernel.
//!
//! Kernel facilities this layer consumes - the handle table, address-space
//! access, memory mapping - are collaborators behind the
//! [`translate::TranslateContext`] trait; this crate only requests
//! duplications, transfers and mappings, it never implements them.
//!
//! # Concurrency
//!
//! Requests are processed to completion, one at a time per session. A
//! function table is immutable once registration finishes, so concurrent
//! lookups from different sessions of the same service need no locking, and
//! each command buffer is exclusively owned by its calling context for the
//! duration of the call.

#![no_std]

extern crate alloc;

pub mod interface;
pub mod port_name;
pub mod registry;
pub mod result;
pub mod session;
pub mod translate;

pub use interface::{DEFAULT_MAX_SESSIONS, FunctionInfo, Interface, RegisterError, Version};
pub use port_name::PortName;
pub use registry::{NamedService, ServiceManager};
pub use result::{ResultCode, ToResultCode};
pub use session::{SessionId, SessionRequest, SessionRequestHandler, SyncContext};
pub use translate::{TranslateContext, TranslateError, translate_command_buffer};
