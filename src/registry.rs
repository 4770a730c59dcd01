//! # Connection registry
//!
//! Tracks the open links of the module. The registry always exposes link IDs: With multiple
//! connections enabled, IDs 0-4 are independent links. Otherwise link 0 is the only valid ID and
//! commands are sent without ID.
use crate::status::Error;
use embedded_nal::SocketAddrV4;

/// Link ID as used by the module
pub type LinkId = usize;

/// Max. number of parallel links of the module
pub const MAX_LINKS: usize = 5;

/// Transport protocol of a link
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Literal used by the module
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

/// Role of the ESP in a link
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Link was opened by the ESP
    Client,

    /// Link was accepted by the server of the ESP
    Server,
}

impl Role {
    /// Parses the role code used by the module. `0`: client, `1`: server
    pub(crate) fn from_code(code: i32) -> Result<Self, Error> {
        match code {
            0 => Ok(Role::Client),
            1 => Ok(Role::Server),
            _ => Err(Error::Invalid),
        }
    }
}

/// An open link
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub link_id: LinkId,
    pub protocol: Protocol,

    /// Remote address. Unspecified for accepted links, until the state got queried.
    pub remote: SocketAddrV4,
    pub role: Role,
}

pub(crate) struct Registry {
    /// True if multiple connections are enabled. Initialized with the module default (disabled).
    multiplexing: bool,

    /// Array index = link_id
    connections: [Option<Connection>; MAX_LINKS],
}

impl Registry {
    pub fn new() -> Self {
        Self {
            multiplexing: false,
            connections: [None; MAX_LINKS],
        }
    }

    pub fn is_multiplexing(&self) -> bool {
        self.multiplexing
    }

    /// Gets called after the module confirmed or reported the mode
    pub fn set_multiplexing(&mut self, enabled: bool) {
        self.multiplexing = enabled;
    }

    /// Number of valid link IDs in the current mode
    pub fn capacity(&self) -> usize {
        if self.multiplexing {
            MAX_LINKS
        } else {
            1
        }
    }

    /// Returns [Error::NoLink] if the ID is not valid in the current mode
    pub fn check(&self, link_id: LinkId) -> Result<(), Error> {
        if link_id >= self.capacity() {
            return Err(Error::NoLink);
        }

        Ok(())
    }

    /// Lowest free link ID
    pub fn next_free(&self) -> Option<LinkId> {
        self.connections[..self.capacity()].iter().position(Option::is_none)
    }

    pub fn get(&self, link_id: LinkId) -> Option<&Connection> {
        self.connections.get(link_id)?.as_ref()
    }

    pub fn insert(&mut self, connection: Connection) {
        if let Some(slot) = self.connections.get_mut(connection.link_id) {
            *slot = Some(connection);
        }
    }

    pub fn remove(&mut self, link_id: LinkId) -> Option<Connection> {
        self.connections.get_mut(link_id)?.take()
    }

    pub fn clear(&mut self) {
        self.connections = [None; MAX_LINKS];
    }

    /// Replaces all links by the state reported by the module
    pub fn replace(&mut self, connections: &[Connection]) {
        self.clear();
        connections.iter().for_each(|connection| self.insert(*connection));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().flatten()
    }
}
