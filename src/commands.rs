//! AT command lines
//!
//! Commands are just encoded by [AtatCmd]. Replies are parsed by the streaming engine.
use crate::responses::NoResponse;
use atat::atat_derive::AtatCmd;
use atat::heapless::String;

/// Attention command, just answered by OK
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("", NoResponse, timeout_ms = 1_000)]
pub struct AttentionCommand;

/// Restarts the module
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+RST", NoResponse, timeout_ms = 1_000)]
pub struct RestartCommand;

/// Queries the firmware version
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+GMR", NoResponse, timeout_ms = 1_000)]
pub struct VersionCommand;

/// Enters deep-sleep mode
#[derive(Clone, AtatCmd)]
#[at_cmd("+GSLP", NoResponse, timeout_ms = 1_000)]
pub struct DeepSleepCommand {
    /// Sleep duration in milliseconds
    time: u32,
}

impl DeepSleepCommand {
    pub fn new(time: u32) -> Self {
        Self { time }
    }
}

/// Changes the UART baud rate
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIOBAUD", NoResponse, timeout_ms = 1_000)]
pub struct BaudrateCommand {
    baudrate: u32,
}

impl BaudrateCommand {
    pub fn new(baudrate: u32) -> Self {
        Self { baudrate }
    }
}

/// Disables command echo
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("E0", NoResponse, timeout_ms = 1_000)]
pub struct EchoOffCommand;

/// Enables command echo
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("E1", NoResponse, timeout_ms = 1_000)]
pub struct EchoOnCommand;

/// Sets the transfer mode
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPMODE", NoResponse, timeout_ms = 1_000)]
pub struct TransferModeCommand {
    /// 0: normal mode, 1: unvarnished transmission mode
    mode: u8,
}

impl TransferModeCommand {
    pub fn new(unvarnished: bool) -> Self {
        Self { mode: unvarnished as u8 }
    }
}

/// Sets the WIFI mode
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWMODE", NoResponse, timeout_ms = 1_000)]
pub struct WifiModeCommand {
    /// WIFI mode:
    ///     1: Station mode.
    ///     2: SoftAP mode.
    ///     3: SoftAP+Station mode.
    mode: u8,
}

impl WifiModeCommand {
    pub fn new(mode: u8) -> Self {
        Self { mode }
    }
}

/// Queries the WIFI mode
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWMODE?", NoResponse, timeout_ms = 1_000)]
pub struct WifiModeQuery;

/// Command for setting the target WIFI access point parameters
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWJAP", NoResponse, timeout_ms = 20_000)]
pub struct AccessPointConnectCommand {
    /// The SSID of the target access point
    ssid: String<32>,

    /// The password/key of the target access point
    password: String<64>,
}

impl AccessPointConnectCommand {
    pub fn new(ssid: String<32>, password: String<64>) -> Self {
        Self { ssid, password }
    }
}

/// Queries the joined access point
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWJAP?", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointQuery;

/// Disconnects from the access point
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWQAP", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointQuitCommand;

/// Configures the soft access point
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWSAP", NoResponse, timeout_ms = 5_000)]
pub struct SoftApConfigCommand {
    ssid: String<32>,
    password: String<64>,
    channel: u8,

    /// 0: open, 1: WEP, 2: WPA_PSK, 3: WPA2_PSK, 4: WPA_WPA2_PSK
    encryption: u8,
}

impl SoftApConfigCommand {
    pub fn new(ssid: String<32>, password: String<64>, channel: u8, encryption: u8) -> Self {
        Self {
            ssid,
            password,
            channel,
            encryption,
        }
    }
}

/// Queries the soft access point configuration
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWSAP?", NoResponse, timeout_ms = 1_000)]
pub struct SoftApConfigQuery;

/// Lists the stations connected to the soft access point
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CWLIF", NoResponse, timeout_ms = 1_000)]
pub struct StationListCommand;

/// Enables/Disables DHCP
#[derive(Clone, AtatCmd)]
#[at_cmd("+CWDHCP", NoResponse, timeout_ms = 1_000)]
pub struct DhcpCommand {
    /// 0: SoftAP, 1: Station, 2: SoftAP+Station
    mode: u8,

    /// 0: disable, 1: enable
    enabled: u8,
}

impl DhcpCommand {
    pub fn new(mode: u8, enabled: bool) -> Self {
        Self {
            mode,
            enabled: enabled as u8,
        }
    }
}

/// Sets the station MAC address
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTAMAC", NoResponse, timeout_ms = 1_000)]
pub struct StationMacCommand {
    mac: String<17>,
}

impl StationMacCommand {
    pub fn new(mac: String<17>) -> Self {
        Self { mac }
    }
}

/// Queries the station MAC address
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPSTAMAC?", NoResponse, timeout_ms = 1_000)]
pub struct StationMacQuery;

/// Sets the soft access point MAC address
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPAPMAC", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointMacCommand {
    mac: String<17>,
}

impl AccessPointMacCommand {
    pub fn new(mac: String<17>) -> Self {
        Self { mac }
    }
}

/// Queries the soft access point MAC address
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPAPMAC?", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointMacQuery;

/// Sets the station IP address
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTA", NoResponse, timeout_ms = 1_000)]
pub struct StationIpCommand {
    ip: String<15>,
}

impl StationIpCommand {
    pub fn new(ip: String<15>) -> Self {
        Self { ip }
    }
}

/// Queries the station IP address
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPSTA?", NoResponse, timeout_ms = 1_000)]
pub struct StationIpQuery;

/// Sets the soft access point IP address
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPAP", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointIpCommand {
    ip: String<15>,
}

impl AccessPointIpCommand {
    pub fn new(ip: String<15>) -> Self {
        Self { ip }
    }
}

/// Queries the soft access point IP address
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPAP?", NoResponse, timeout_ms = 1_000)]
pub struct AccessPointIpQuery;

/// Queries the connection state and all open links
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPSTATUS", NoResponse, timeout_ms = 1_000)]
pub struct ConnectionStatusCommand;

/// Establish TCP Connection or UDP Transmission on the given link
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTART", NoResponse, timeout_ms = 10_000, attempts = 1)]
pub struct ConnectCommand {
    /// Socket ID
    link_id: usize,

    /// Connection type, TCP or UDP
    connection_type: String<3>,

    /// Remote IPv4 address
    remote_host: String<15>,

    /// Remote port
    port: u16,
}

impl ConnectCommand {
    pub fn new(link_id: usize, connection_type: &str, remote_host: String<15>, port: u16) -> Self {
        Self {
            link_id,
            connection_type: String::try_from(connection_type).unwrap_or_default(),
            remote_host,
            port,
        }
    }
}

/// Establish TCP Connection or UDP Transmission if multiple connections are disabled
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTART", NoResponse, timeout_ms = 10_000, attempts = 1)]
pub struct SingleConnectCommand {
    connection_type: String<3>,
    remote_host: String<15>,
    port: u16,
}

impl SingleConnectCommand {
    pub fn new(connection_type: &str, remote_host: String<15>, port: u16) -> Self {
        Self {
            connection_type: String::try_from(connection_type).unwrap_or_default(),
            remote_host,
            port,
        }
    }
}

/// Initiates the transmission of data on the given link
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSEND", NoResponse, timeout_ms = 5_000)]
pub struct TransmissionPrepareCommand {
    link_id: usize,

    /// Length of data in bytes
    length: usize,
}

impl TransmissionPrepareCommand {
    pub fn new(link_id: usize, length: usize) -> Self {
        Self { link_id, length }
    }
}

/// Initiates the transmission of data if multiple connections are disabled
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSEND", NoResponse, timeout_ms = 5_000)]
pub struct SingleTransmissionPrepareCommand {
    length: usize,
}

impl SingleTransmissionPrepareCommand {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

/// Closes the given link. Link ID 5 closes all links.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPCLOSE", NoResponse, timeout_ms = 5_000)]
pub struct CloseSocketCommand {
    link_id: usize,
}

impl CloseSocketCommand {
    pub fn new(link_id: usize) -> Self {
        Self { link_id }
    }
}

/// Closes the link if multiple connections are disabled
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPCLOSE", NoResponse, timeout_ms = 5_000)]
pub struct SingleCloseCommand;

/// Enables/Disables multiple connections
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPMUX", NoResponse, timeout_ms = 1_000)]
pub struct SetMultipleConnectionsCommand {
    /// 0: single connection, 1: multiple connections
    mode: u8,
}

impl SetMultipleConnectionsCommand {
    pub fn new(enabled: bool) -> Self {
        Self { mode: enabled as u8 }
    }
}

/// Queries if multiple connections are enabled
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPMUX?", NoResponse, timeout_ms = 1_000)]
pub struct MultipleConnectionsQuery;

/// Creates a TCP server
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSERVER", NoResponse, timeout_ms = 1_000)]
pub struct ServerCreateCommand {
    /// Always 1
    mode: u8,
    port: u16,
}

impl ServerCreateCommand {
    pub fn new(port: u16) -> Self {
        Self { mode: 1, port }
    }
}

/// Deletes the TCP server
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSERVER", NoResponse, timeout_ms = 1_000)]
pub struct ServerDeleteCommand {
    /// Always 0
    mode: u8,
}

impl Default for ServerDeleteCommand {
    fn default() -> Self {
        Self { mode: 0 }
    }
}

/// Sets the server timeout
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTO", NoResponse, timeout_ms = 1_000)]
pub struct ServerTimeoutCommand {
    /// Timeout in seconds, 0-7200
    timeout: u16,
}

impl ServerTimeoutCommand {
    pub fn new(timeout: u16) -> Self {
        Self { timeout }
    }
}

/// Queries the server timeout
#[derive(Clone, Default, AtatCmd)]
#[at_cmd("+CIPSTO?", NoResponse, timeout_ms = 1_000)]
pub struct ServerTimeoutQuery;
