//! # Unsolicited notices
//!
//! Lines sent by the module on its own between command replies.
use crate::registry::LinkId;

/// Unsolicited message of the module
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    /// Module is ready for receiving AT commands
    Ready,
    /// WIFi connection state changed to to connected
    WifiConnected,
    /// Wifi connection state changed to disconnected
    WifiDisconnected,
    /// Received an IP from the access point
    ReceivedIp,
    /// Link with the given ID connected. Unrequested this signals a link accepted by the server.
    LinkConnected(LinkId),
    /// Link with the given ID was closed
    LinkClosed(LinkId),
    /// Unknown message
    Unknown,
}

impl Notice {
    /// Parses a single line without line break. Returns None for empty lines.
    pub fn parse(line: &[u8]) -> Option<Self> {
        let notice = match line {
            b"" => return None,
            b"ready" => Self::Ready,
            b"WIFI CONNECTED" => Self::WifiConnected,
            b"WIFI DISCONNECT" => Self::WifiDisconnected,
            b"WIFI GOT IP" => Self::ReceivedIp,
            // Multiple connections disabled
            b"CONNECT" => Self::LinkConnected(0),
            b"CLOSED" => Self::LinkClosed(0),
            [link_id, b',', state @ ..] => match (Self::parse_link_id(*link_id), state) {
                (Some(link_id), b"CONNECT") => Self::LinkConnected(link_id),
                (Some(link_id), b"CLOSED") => Self::LinkClosed(link_id),
                _ => Self::Unknown,
            },
            _ => Self::Unknown,
        };

        Some(notice)
    }

    /// Parses the link id. Supports just links 0-4
    fn parse_link_id(link_id: u8) -> Option<LinkId> {
        match link_id {
            b'0'..=b'4' => Some((link_id - b'0') as LinkId),
            _ => None,
        }
    }
}
