//! # WIFI commands
//!
//! Joining access points, configuring the soft access point and obtaining address information.
//!
//! Note: If the connection was not successful or is lost, the module will try independently from time
//! to time to reconnect to the stored access point.
//!
//! ## Example
//!
//! ````
//! # use esp8266_at::adapter::Adapter;
//! # use esp8266_at::example::{ExampleSerial, ExampleTimer};
//! # use esp8266_at::wifi::{Interface, WifiMode};
//! #
//! let mut adapter: Adapter<_, _, 1_000_000, 256> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//! adapter.begin().unwrap();
//!
//! // Joining the target WIFI access point
//! adapter.set_wifi_mode(WifiMode::Station).unwrap();
//! adapter.join_ap("test_wifi", "secret").unwrap();
//!
//! let ip = adapter.get_ip(Interface::Station).unwrap();
//! assert_eq!("10.0.0.181", ip.to_string());
//!
//! let mac = adapter.get_mac(Interface::Station).unwrap();
//! assert_eq!([0x10, 0xfe, 0xed, 0x05, 0xba, 0x50], mac);
//! ````
use crate::adapter::Adapter;
use crate::commands::{
    AccessPointConnectCommand, AccessPointIpCommand, AccessPointIpQuery, AccessPointMacCommand, AccessPointMacQuery,
    AccessPointQuery, AccessPointQuitCommand, DhcpCommand, SoftApConfigCommand, SoftApConfigQuery, StationIpCommand,
    StationIpQuery, StationListCommand, StationMacCommand, StationMacQuery, WifiModeCommand, WifiModeQuery,
};
use crate::status::{Completion, Error};
use embedded_io::{Read, ReadReady, Write};
use embedded_nal::Ipv4Addr;
use fugit_timer::Timer;
use heapless::{String, Vec};
use numtoa::NumToA;

/// Max. SSID length in bytes
pub const MAX_SSID_LENGTH: usize = 32;

/// Max. password length in bytes
pub const MAX_PASSWORD_LENGTH: usize = 64;

/// SSID of an access point
pub type Ssid = String<MAX_SSID_LENGTH>;

/// Password/Key of an access point
pub type Password = String<MAX_PASSWORD_LENGTH>;

/// MAC address
pub type MacAddress = [u8; 6];

/// WIFI operating mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiMode {
    /// Connects to an access point
    Station,

    /// Operates an own access point (SoftAP)
    AccessPoint,

    /// Station and SoftAP
    Both,
}

impl WifiMode {
    fn code(&self) -> u8 {
        match self {
            WifiMode::Station => 1,
            WifiMode::AccessPoint => 2,
            WifiMode::Both => 3,
        }
    }

    fn from_code(code: u32) -> Result<Self, Error> {
        match code {
            1 => Ok(WifiMode::Station),
            2 => Ok(WifiMode::AccessPoint),
            3 => Ok(WifiMode::Both),
            _ => Err(Error::Invalid),
        }
    }

    /// Mode parameter of the DHCP command, which differs from the mode command
    fn dhcp_code(&self) -> u8 {
        match self {
            WifiMode::AccessPoint => 0,
            WifiMode::Station => 1,
            WifiMode::Both => 2,
        }
    }
}

/// Network interface owning an address
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    Station,
    AccessPoint,
}

/// Encryption of the soft access point
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encryption {
    Open,
    Wep,
    WpaPsk,
    Wpa2Psk,
    WpaWpa2Psk,
}

impl Encryption {
    fn code(&self) -> u8 {
        match self {
            Encryption::Open => 0,
            Encryption::Wep => 1,
            Encryption::WpaPsk => 2,
            Encryption::Wpa2Psk => 3,
            Encryption::WpaWpa2Psk => 4,
        }
    }

    fn from_code(code: u32) -> Result<Self, Error> {
        match code {
            0 => Ok(Encryption::Open),
            1 => Ok(Encryption::Wep),
            2 => Ok(Encryption::WpaPsk),
            3 => Ok(Encryption::Wpa2Psk),
            4 => Ok(Encryption::WpaWpa2Psk),
            _ => Err(Error::Invalid),
        }
    }
}

/// Configuration of the soft access point
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessPointConfig {
    pub ssid: Ssid,
    pub password: Password,
    pub channel: u8,
    pub encryption: Encryption,
}

impl AccessPointConfig {
    /// Creates a configuration on channel 6 with WPA/WPA2 encryption.
    /// Returns [Error::TooLong] if SSID or password are exceeding the limits of the module.
    pub fn new(ssid: &str, password: &str) -> Result<Self, Error> {
        Ok(Self {
            ssid: String::try_from(ssid).map_err(|_| Error::TooLong)?,
            password: String::try_from(password).map_err(|_| Error::TooLong)?,
            channel: 6,
            encryption: Encryption::WpaWpa2Psk,
        })
    }
}

/// Station connected to the soft access point
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Station {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    Adapter<S, T, TIMER_HZ, RX_SIZE>
{
    /// Sets the WIFI mode
    pub fn set_wifi_mode(&mut self, mode: WifiMode) -> Result<Completion, Error> {
        self.execute(&WifiModeCommand::new(mode.code()))
    }

    /// Queries the WIFI mode
    pub fn get_wifi_mode(&mut self) -> Result<WifiMode, Error> {
        let deadline = self.dispatch(&WifiModeQuery)?;
        self.seek(b"+CWMODE:", deadline)?;
        let mode = WifiMode::from_code(self.link.parse_bounded(u8::MAX as u32, deadline)?)?;

        self.finish(deadline)?;
        Ok(mode)
    }

    /// Connects to an WIFI access point
    pub fn join_ap(&mut self, ssid: &str, password: &str) -> Result<Completion, Error> {
        let ssid = String::try_from(ssid).map_err(|_| Error::TooLong)?;
        let password = String::try_from(password).map_err(|_| Error::TooLong)?;

        self.execute(&AccessPointConnectCommand::new(ssid, password))
    }

    /// Returns the SSID of the joined access point, None if not joined
    pub fn get_ap(&mut self) -> Result<Option<Ssid>, Error> {
        let deadline = self.dispatch(&AccessPointQuery)?;

        match self.link.find_strings(&[b"+CWJAP:\"", b"No AP", b"ERROR"], false, deadline)? {
            0 => {
                let ssid = self.read_quoted(deadline)?;
                self.finish(deadline)?;
                Ok(Some(ssid))
            }
            1 => {
                self.finish(deadline)?;
                Ok(None)
            }
            _ => Err(Error::Rejected),
        }
    }

    /// Disconnects from the access point
    pub fn quit_ap(&mut self) -> Result<Completion, Error> {
        self.execute(&AccessPointQuitCommand)
    }

    /// Configures the soft access point
    pub fn set_ap_configuration(&mut self, config: &AccessPointConfig) -> Result<Completion, Error> {
        self.execute(&SoftApConfigCommand::new(
            config.ssid.clone(),
            config.password.clone(),
            config.channel,
            config.encryption.code(),
        ))
    }

    /// Returns the configuration of the soft access point
    pub fn get_ap_configuration(&mut self) -> Result<AccessPointConfig, Error> {
        let deadline = self.dispatch(&SoftApConfigQuery)?;
        self.seek(b"+CWSAP:\"", deadline)?;

        let ssid = self.read_quoted(deadline)?;
        self.link.expect(b",\"", deadline)?;
        let password = self.read_quoted(deadline)?;
        self.link.expect(b",", deadline)?;
        let channel = self.link.parse_bounded(u8::MAX as u32, deadline)? as u8;
        self.link.expect(b",", deadline)?;
        let encryption = Encryption::from_code(self.link.parse_bounded(u8::MAX as u32, deadline)?)?;

        self.finish(deadline)?;
        Ok(AccessPointConfig {
            ssid,
            password,
            channel,
            encryption,
        })
    }

    /// Returns the stations connected to the soft access point.
    ///
    /// At most N stations are returned. Further stations reported by the module are skipped.
    pub fn get_connected_stations<const N: usize>(&mut self) -> Result<Vec<Station, N>, Error> {
        let deadline = self.dispatch(&StationListCommand)?;
        let mut stations = Vec::new();

        loop {
            self.link.skip_line_breaks(deadline)?;
            if !self.link.peek(deadline)?.is_ascii_digit() {
                break;
            }

            let ip = self.link.parse_ip(deadline)?;
            self.link.expect(b",", deadline)?;
            let mac = self.link.parse_mac(deadline)?;

            if stations.push(Station { ip, mac }).is_err() {
                trace!("Skipping station, capacity of {} reached", N);
            }
        }

        self.finish(deadline)?;
        Ok(stations)
    }

    /// Enables/Disables DHCP for the given mode
    pub fn set_dhcp(&mut self, mode: WifiMode, enabled: bool) -> Result<Completion, Error> {
        self.execute(&DhcpCommand::new(mode.dhcp_code(), enabled))
    }

    /// Sets the MAC address of the interface
    pub fn set_mac(&mut self, interface: Interface, mac: MacAddress) -> Result<Completion, Error> {
        let mac = format_mac(&mac);

        match interface {
            Interface::Station => self.execute(&StationMacCommand::new(mac)),
            Interface::AccessPoint => self.execute(&AccessPointMacCommand::new(mac)),
        }
    }

    /// Returns the MAC address of the interface
    pub fn get_mac(&mut self, interface: Interface) -> Result<MacAddress, Error> {
        let deadline = match interface {
            Interface::Station => self.dispatch(&StationMacQuery)?,
            Interface::AccessPoint => self.dispatch(&AccessPointMacQuery)?,
        };
        let prefix: &[u8] = match interface {
            Interface::Station => b"+CIPSTAMAC:\"",
            Interface::AccessPoint => b"+CIPAPMAC:\"",
        };

        self.seek(prefix, deadline)?;
        let mac = self.link.parse_mac(deadline)?;

        self.finish(deadline)?;
        Ok(mac)
    }

    /// Sets the static IP address of the interface
    pub fn set_ip(&mut self, interface: Interface, ip: Ipv4Addr) -> Result<Completion, Error> {
        let ip = format_ip(&ip);

        match interface {
            Interface::Station => self.execute(&StationIpCommand::new(ip)),
            Interface::AccessPoint => self.execute(&AccessPointIpCommand::new(ip)),
        }
    }

    /// Returns the IP address of the interface
    pub fn get_ip(&mut self, interface: Interface) -> Result<Ipv4Addr, Error> {
        let deadline = match interface {
            Interface::Station => self.dispatch(&StationIpQuery)?,
            Interface::AccessPoint => self.dispatch(&AccessPointIpQuery)?,
        };
        let prefix: &[u8] = match interface {
            Interface::Station => b"+CIPSTA:",
            Interface::AccessPoint => b"+CIPAP:",
        };

        // Newer firmware is labeling the address (`+CIPSTA:ip:"..."`) and reports gateway and netmask as well
        self.seek(prefix, deadline)?;
        if !self.link.find(b"\"", deadline)? {
            return Err(Error::Timeout);
        }
        let ip = self.link.parse_ip(deadline)?;

        self.finish(deadline)?;
        Ok(ip)
    }
}

/// Dotted-decimal representation of the address
pub(crate) fn format_ip(ip: &Ipv4Addr) -> String<15> {
    let mut string = String::new();

    for (index, octet) in ip.octets().iter().enumerate() {
        if index > 0 {
            let _ = string.push('.');
        }

        let mut digits = [0x0; 8];
        let start = octet.numtoa(10, &mut digits);
        digits[start..].iter().for_each(|digit| {
            let _ = string.push(*digit as char);
        });
    }

    string
}

/// Colon separated lower case hex representation of the address
pub(crate) fn format_mac(mac: &MacAddress) -> String<17> {
    let mut string = String::new();

    for (index, byte) in mac.iter().enumerate() {
        if index > 0 {
            let _ = string.push(':');
        }

        for digit in base16::encode_byte_l(*byte) {
            let _ = string.push(digit as char);
        }
    }

    string
}
