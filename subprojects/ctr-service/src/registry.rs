//! Named service registry.
//!
//! The environment resolves which service interface answers a port by name.
//! The registry is an owned object created once at process startup and torn
//! down at shutdown - deliberately not a global, so the protocol core stays
//! free of ambient state and tests can run registries side by side.

use alloc::{boxed::Box, collections::BTreeMap};

use crate::{
    interface::{DEFAULT_MAX_SESSIONS, Interface},
    port_name::PortName,
    session::SessionRequestHandler,
};

/// A registrable service: a session request handler with a port identity.
pub trait NamedService: SessionRequestHandler {
    /// Name of the port this service answers.
    fn port_name(&self) -> PortName;

    /// Maximum simultaneous client connections to this port.
    fn max_sessions(&self) -> u32 {
        DEFAULT_MAX_SESSIONS
    }
}

impl<S> NamedService for Interface<S> {
    fn port_name(&self) -> PortName {
        Interface::port_name(self)
    }

    fn max_sessions(&self) -> u32 {
        Interface::max_sessions(self)
    }
}

/// Error returned by [`ServiceManager::add_service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A service is already registered under this port name.
    #[error("port {0} already registered")]
    PortTaken(PortName),
}

/// Registry mapping port names to service interfaces.
///
/// Lives for the process lifetime: constructed during service-module init,
/// shut down once when the process exits.
pub struct ServiceManager {
    services: BTreeMap<PortName, Box<dyn NamedService>>,
}

impl ServiceManager {
    pub fn new() -> Self {
        Self {
            services: BTreeMap::new(),
        }
    }

    /// Registers a service under its own port name.
    pub fn add_service(&mut self, service: Box<dyn NamedService>) -> Result<(), RegistryError> {
        let name = service.port_name();
        if self.services.contains_key(&name) {
            log::warn!("service registration rejected, port {name} already taken");
            return Err(RegistryError::PortTaken(name));
        }
        log::debug!(
            "registered service {name} (max {} sessions)",
            service.max_sessions()
        );
        self.services.insert(name, service);
        Ok(())
    }

    /// Looks up the service answering `name`.
    pub fn service(&self, name: PortName) -> Option<&dyn NamedService> {
        self.services.get(&name).map(|s| &**s)
    }

    /// Mutable lookup, used to deliver requests.
    pub fn service_mut(&mut self, name: PortName) -> Option<&mut (dyn NamedService + 'static)> {
        self.services.get_mut(&name).map(|s| &mut **s)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Drops every registered service. Called once at process teardown.
    pub fn shutdown(&mut self) {
        log::debug!("shutting down {} registered services", self.services.len());
        self.services.clear();
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}
