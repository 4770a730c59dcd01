//! # TCP/IP commands
//!
//! Opening, using and closing links. Links are addressed by ID, even if multiple connections are
//! disabled. In this case link 0 is the only valid ID.
//!
//! Received socket data is buffered per link (s. [Adapter::available] and [Adapter::read]).
//!
//! ## Example
//!
//! ````
//! # use esp8266_at::adapter::Adapter;
//! # use esp8266_at::example::{ExampleSerial, ExampleTimer};
//! # use esp8266_at::registry::Protocol;
//! # use embedded_nal::{Ipv4Addr, SocketAddrV4};
//! #
//! let mut adapter: Adapter<_, _, 1_000_000, 256> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//! adapter.begin().unwrap();
//! adapter.set_wifi_mode(esp8266_at::wifi::WifiMode::Station).unwrap();
//! adapter.join_ap("test_wifi", "secret").unwrap();
//!
//! // Opening a TCP connection on the next free link
//! adapter.set_multiplexing(true).unwrap();
//! let link_id = adapter.connect(Protocol::Tcp, SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 21)).unwrap();
//!
//! // Sending data and reading the answer
//! adapter.send(link_id, b"hallo!").unwrap();
//!
//! let mut buffer = [0x0; 32];
//! let length = adapter.read(link_id, &mut buffer).unwrap();
//! assert_eq!(b"nice to see you!", &buffer[..length]);
//!
//! adapter.close(link_id).unwrap();
//! ````
use crate::adapter::Adapter;
use crate::commands::{
    CloseSocketCommand, ConnectCommand, ConnectionStatusCommand, MultipleConnectionsQuery, ServerCreateCommand,
    ServerDeleteCommand, ServerTimeoutCommand, ServerTimeoutQuery, SetMultipleConnectionsCommand, SingleCloseCommand,
    SingleConnectCommand, SingleTransmissionPrepareCommand, TransmissionPrepareCommand,
};
use crate::link::Polled;
use crate::registry::{Connection, LinkId, Protocol, Role, MAX_LINKS};
use crate::status::{Completion, Error};
use crate::wifi::format_ip;
use embedded_io::{Read, ReadReady, Write};
use embedded_nal::SocketAddrV4;
use fugit::TimerInstantU32;
use fugit_timer::Timer;
use heapless::Vec;

/// Max. length of data sent by a single command
pub const MAX_SEND_LENGTH: usize = 2048;

/// Global link state as reported by `AT+CIPSTATUS`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Station is connected to an access point and got an IP
    GotIp,

    /// At least one link is open
    Connected,

    /// All links got closed
    Disconnected,

    /// Station is not connected to an access point
    NotConnected,
}

impl LinkState {
    fn from_code(code: u32) -> Result<Self, Error> {
        match code {
            2 => Ok(LinkState::GotIp),
            3 => Ok(LinkState::Connected),
            4 => Ok(LinkState::Disconnected),
            5 => Ok(LinkState::NotConnected),
            _ => Err(Error::Invalid),
        }
    }
}

/// Reply of [Adapter::get_connection_status]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: LinkState,
    pub connections: Vec<Connection, MAX_LINKS>,
}

/// Action of [Adapter::configure_server]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServerMode {
    Create,
    Delete,
}

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    Adapter<S, T, TIMER_HZ, RX_SIZE>
{
    /// Queries the link state and all open links. The local registry is synchronized with the result.
    pub fn get_connection_status(&mut self) -> Result<ConnectionStatus, Error> {
        let deadline = self.dispatch(&ConnectionStatusCommand)?;
        self.seek(b"STATUS:", deadline)?;

        let state = LinkState::from_code(self.link.parse_bounded(u8::MAX as u32, deadline)?)?;
        let mut connections = Vec::new();

        loop {
            self.link.skip_line_breaks(deadline)?;
            if self.link.peek(deadline)? != b'+' {
                break;
            }

            self.link.expect(b"+CIPSTATUS:", deadline)?;
            let connection = self.parse_connection(deadline)?;
            if connections.push(connection).is_err() {
                return Err(Error::Invalid);
            }
        }

        self.finish(deadline)?;
        self.registry.replace(&connections);

        Ok(ConnectionStatus { state, connections })
    }

    /// Parses a single `+CIPSTATUS` record after its prefix.
    ///
    /// Older firmware reports `<id>,<type>,<ip>,<port>,<role>`, newer firmware adds the local port
    /// before the role.
    fn parse_connection(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<Connection, Error> {
        let link_id = self.link.parse_bounded((MAX_LINKS - 1) as u32, deadline)? as LinkId;
        self.link.expect(b",\"", deadline)?;
        let protocol = self.link.parse_protocol(deadline)?;
        self.link.expect(b"\",\"", deadline)?;
        let ip = self.link.parse_ip(deadline)?;
        self.link.expect(b"\",", deadline)?;
        let port = self.link.parse_bounded(u16::MAX as u32, deadline)? as u16;
        self.link.expect(b",", deadline)?;

        let field = self.link.parse_int(deadline)?;
        let role = if self.link.peek(deadline)? == b',' {
            self.link.read(deadline)?;
            self.link.parse_role(deadline)?
        } else {
            Role::from_code(field)?
        };

        Ok(Connection {
            link_id,
            protocol,
            remote: SocketAddrV4::new(ip, port),
            role,
        })
    }

    /// Opens a link on the lowest free ID and returns the ID.
    /// Returns [Error::Rejected] if no link is available.
    pub fn connect(&mut self, protocol: Protocol, remote: SocketAddrV4) -> Result<LinkId, Error> {
        let link_id = self.registry.next_free().ok_or(Error::Rejected)?;
        self.connect_link(link_id, protocol, remote)?;

        Ok(link_id)
    }

    /// Opens a link on the given ID
    pub fn connect_link(
        &mut self,
        link_id: LinkId,
        protocol: Protocol,
        remote: SocketAddrV4,
    ) -> Result<Completion, Error> {
        self.registry.check(link_id)?;
        let host = format_ip(remote.ip());

        let completion = if self.registry.is_multiplexing() {
            self.execute(&ConnectCommand::new(link_id, protocol.as_str(), host, remote.port()))?
        } else {
            self.execute(&SingleConnectCommand::new(protocol.as_str(), host, remote.port()))?
        };

        self.registry.insert(Connection {
            link_id,
            protocol,
            remote,
            role: Role::Client,
        });
        Ok(completion)
    }

    /// Sends the data on the given link.
    ///
    /// Returns [Error::TooLong] without writing anything if data exceeds [MAX_SEND_LENGTH].
    pub fn send(&mut self, link_id: LinkId, data: &[u8]) -> Result<Completion, Error> {
        if data.len() > MAX_SEND_LENGTH {
            return Err(Error::TooLong);
        }
        self.registry.check(link_id)?;

        let deadline = if self.registry.is_multiplexing() {
            self.dispatch(&TransmissionPrepareCommand::new(link_id, data.len()))?
        } else {
            self.dispatch(&SingleTransmissionPrepareCommand::new(data.len()))?
        };

        match self.link.find_strings(&[b">", b"ERROR", b"link is not valid"], false, deadline)? {
            0 => {}
            1 => return Err(Error::Rejected),
            _ => return Err(Error::NoLink),
        }

        trace!("Writing {} bytes to link {}", data.len(), link_id);
        self.link.write_data(data)?;
        self.finish(deadline)
    }

    /// Closes the given link
    pub fn close(&mut self, link_id: LinkId) -> Result<Completion, Error> {
        self.registry.check(link_id)?;

        let completion = if self.registry.is_multiplexing() {
            self.execute(&CloseSocketCommand::new(link_id))?
        } else {
            self.execute(&SingleCloseCommand)?
        };

        self.registry.remove(link_id);
        Ok(completion)
    }

    /// Closes all links
    pub fn close_all(&mut self) -> Result<Completion, Error> {
        let completion = if self.registry.is_multiplexing() {
            self.execute(&CloseSocketCommand::new(MAX_LINKS))?
        } else {
            self.execute(&SingleCloseCommand)?
        };

        self.registry.clear();
        Ok(completion)
    }

    /// Enables/Disables multiple connections
    pub fn set_multiplexing(&mut self, enabled: bool) -> Result<Completion, Error> {
        let completion = self.execute(&SetMultipleConnectionsCommand::new(enabled))?;
        self.registry.set_multiplexing(enabled);

        Ok(completion)
    }

    /// Queries if multiple connections are enabled
    pub fn get_multiplexing(&mut self) -> Result<bool, Error> {
        let deadline = self.dispatch(&MultipleConnectionsQuery)?;
        self.seek(b"+CIPMUX:", deadline)?;
        let enabled = self.link.parse_bounded(1, deadline)? == 1;

        self.finish(deadline)?;
        self.registry.set_multiplexing(enabled);
        Ok(enabled)
    }

    /// Creates or deletes the TCP server. The port is ignored on deletion.
    pub fn configure_server(&mut self, mode: ServerMode, port: u16) -> Result<Completion, Error> {
        match mode {
            ServerMode::Create => self.execute(&ServerCreateCommand::new(port)),
            ServerMode::Delete => self.execute(&ServerDeleteCommand::default()),
        }
    }

    /// Sets the timeout in seconds, after which the server closes inactive links
    pub fn set_server_timeout(&mut self, timeout: u16) -> Result<Completion, Error> {
        self.execute(&ServerTimeoutCommand::new(timeout))
    }

    /// Returns the server timeout in seconds
    pub fn get_server_timeout(&mut self) -> Result<u16, Error> {
        let deadline = self.dispatch(&ServerTimeoutQuery)?;
        self.seek(b"+CIPSTO:", deadline)?;
        let timeout = self.link.parse_bounded(u16::MAX as u32, deadline)? as u16;

        self.finish(deadline)?;
        Ok(timeout)
    }

    /// Returns the number of buffered bytes of the given link. Processes pending input before.
    pub fn available(&mut self, link_id: LinkId) -> usize {
        self.process_pending();
        self.link.inbound.available(link_id)
    }

    /// Returns the lowest link ID with buffered data. Processes pending input before.
    pub fn next_available(&mut self) -> Option<LinkId> {
        self.process_pending();
        self.link.inbound.next_available()
    }

    /// Reads a single byte of the given link. Waits up to the default timeout for data.
    pub fn read_byte(&mut self, link_id: LinkId) -> Result<u8, Error> {
        self.wait_for_data(link_id)?;
        self.link.inbound.pop(link_id).ok_or(Error::Timeout)
    }

    /// Moves buffered data of the given link to the buffer and returns the length. Waits up to the
    /// default timeout if no data is buffered.
    pub fn read(&mut self, link_id: LinkId, buffer: &mut [u8]) -> Result<usize, Error> {
        if buffer.is_empty() {
            return Ok(0);
        }

        self.wait_for_data(link_id)?;
        Ok(self.link.inbound.drain_into(link_id, buffer))
    }

    /// Pumps input until data of the link is buffered
    fn wait_for_data(&mut self, link_id: LinkId) -> Result<(), Error> {
        if self.link.inbound.available(link_id) > 0 {
            return Ok(());
        }
        self.registry.check(link_id)?;

        let deadline = self.link.deadline(self.link.timeout_ms);
        while self.link.inbound.available(link_id) == 0 {
            if let Polled::Frame(other) = self.pump(deadline)? {
                trace!("Buffered data of link {} while waiting for link {}", other, link_id);
            }
        }

        Ok(())
    }

    /// Returns the open link with the given ID
    pub fn connection(&self, link_id: LinkId) -> Option<&Connection> {
        self.registry.get(link_id)
    }

    /// Returns all open links
    ///
    /// Link notices arriving in the middle of another command's reply are not seen, so the
    /// registry may be stale until [Adapter::get_connection_status()] synchronizes it.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.registry.iter()
    }

    /// True if multiple connections are known to be enabled
    pub fn is_multiplexing(&self) -> bool {
        self.registry.is_multiplexing()
    }
}
