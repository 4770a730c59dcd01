//! # Central driver
//!
//! [Adapter] owns the serial link and dispatches AT commands. Every command follows the same
//! sequence:
//! 1. Pending input (notices, data frames) is processed
//! 2. The command line is written
//! 3. Structured reply values are scanned
//! 4. The final status is read
//!
//! Commands are strictly sequential, the next command is never written before the status of the
//! previous one was read. The adapter is not reentrant, which is enforced by `&mut self`. For
//! sharing between execution contexts s. [SharedAdapter](crate::shared::SharedAdapter).
//!
//! ## Example
//!
//! ````
//! # use esp8266_at::adapter::Adapter;
//! # use esp8266_at::example::{ExampleSerial, ExampleTimer};
//! #
//! let mut adapter: Adapter<_, _, 1_000_000, 256> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//!
//! // Disables echo and checks that the module is responding
//! adapter.begin().unwrap();
//! adapter.test().unwrap();
//! ````
use crate::commands::{
    AttentionCommand, BaudrateCommand, DeepSleepCommand, EchoOffCommand, EchoOnCommand, RestartCommand,
    TransferModeCommand, VersionCommand,
};
use crate::link::{Link, Polled};
use crate::notice::Notice;
use crate::registry::{Connection, Protocol, Registry, Role};
use crate::status::{Completion, Error};
use atat::AtatCmd;
use embedded_io::{Read, ReadReady, Write};
use embedded_nal::{Ipv4Addr, SocketAddrV4};
use fugit::TimerInstantU32;
use fugit_timer::Timer;
use heapless::{String, Vec};

/// Default timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u32 = 1_000;

/// Time waiting for `ready` after restart
const RESTART_TIMEOUT_MS: u32 = 5_000;

/// Silence period, which ends draining of input on startup
const CLEAR_QUIET_MS: u32 = 10;

/// Number of `AT` attempts on startup
const BEGIN_ATTEMPTS: usize = 3;

/// Max. length of a notice line. Longer lines are no notices.
const NOTICE_LINE_SIZE: usize = 32;

/// Max. length of the version information
pub const VERSION_SIZE: usize = 128;

/// Firmware version information as reported by the module
pub type Version = String<VERSION_SIZE>;

/// Central client for communication with the module
///
/// RX_SIZE: Buffer size in bytes of each link for received socket data. Data exceeding the buffer gets dropped.
pub struct Adapter<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> {
    /// Serial link
    pub(crate) link: Link<S, T, TIMER_HZ, RX_SIZE>,

    /// Open links
    pub(crate) registry: Registry,

    /// Incomplete notice line
    line: Vec<u8, NOTICE_LINE_SIZE>,
}

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    Adapter<S, T, TIMER_HZ, RX_SIZE>
{
    /// Creates a new adapter. No command is sent, s. [Adapter::begin()].
    pub fn new(serial: S, timer: T) -> Self {
        Self {
            link: Link::new(serial, timer, DEFAULT_TIMEOUT_MS),
            registry: Registry::new(),
            line: Vec::new(),
        }
    }

    /// Releases the serial transport and the timer
    pub fn release(self) -> (S, T) {
        (self.link.serial, self.link.timer)
    }

    /// Sets the default timeout in ms. Commands with a longer processing time (e.g. joining an
    /// access point) use their own, longer timeout.
    pub fn set_timeout(&mut self, timeout_ms: u32) {
        self.link.timeout_ms = timeout_ms;
    }

    /// Returns the default timeout in ms
    pub fn timeout(&self) -> u32 {
        self.link.timeout_ms
    }

    /// Prepares the module: Discards startup output, waits for the module to answer, disables
    /// echo and synchronizes the multiplexing state.
    ///
    /// Echo needs to be disabled, as echoed arguments may be mistaken for status replies.
    pub fn begin(&mut self) -> Result<(), Error> {
        self.link.clear(CLEAR_QUIET_MS);
        self.reset_state();

        let mut result = Err(Error::Timeout);
        for _ in 0..BEGIN_ATTEMPTS {
            result = self.test();
            if result.is_ok() {
                break;
            }
        }
        result?;

        self.initialize()
    }

    /// Disables echo, selects the normal transfer mode and reads the multiplexing state
    fn initialize(&mut self) -> Result<(), Error> {
        self.set_echo(false)?;
        self.set_transfer_mode(false)?;

        // Multiplexing is kept by the module if only the host got reset
        self.get_multiplexing()?;
        Ok(())
    }

    /// Sends `AT` for checking that the module is responding
    pub fn test(&mut self) -> Result<Completion, Error> {
        self.execute(&AttentionCommand)
    }

    /// Restarts the module and blocks until ready. Open links and buffered data get dropped.
    pub fn restart(&mut self) -> Result<(), Error> {
        self.execute(&RestartCommand)?;

        let deadline = self.link.deadline(RESTART_TIMEOUT_MS);
        if !self.link.find(b"ready", deadline)? {
            return Err(Error::Timeout);
        }

        self.reset_state();
        self.initialize()
    }

    /// Returns the firmware version information. Gets truncated if exceeding [VERSION_SIZE].
    pub fn get_version(&mut self) -> Result<Version, Error> {
        let deadline = self.dispatch(&VersionCommand)?;
        self.link.skip_line_breaks(deadline)?;

        let mut buffer = [0x0; VERSION_SIZE];
        let copied = self.link.read_until_any(&mut buffer, &[b"\r\nOK", b"ERROR"], deadline)?;

        match (copied.terminated, copied.target) {
            (true, 0) => {}
            (true, _) => return Err(Error::Rejected),
            // Information got truncated
            (false, _) => {
                self.finish(deadline)?;
            }
        }

        let version = core::str::from_utf8(&buffer[..copied.length]).map_err(|_| Error::Invalid)?;
        String::try_from(version.trim_end()).map_err(|_| Error::Invalid)
    }

    /// Enters deep-sleep mode for the given time in ms
    pub fn deep_sleep(&mut self, time_ms: u32) -> Result<Completion, Error> {
        self.execute(&DeepSleepCommand::new(time_ms))
    }

    /// Changes the baud rate of the module.
    ///
    /// The status reply is sent with the new baud rate, so it's not read. The transport needs to
    /// be reconfigured by the caller.
    pub fn set_baudrate(&mut self, baudrate: u32) -> Result<(), Error> {
        self.dispatch(&BaudrateCommand::new(baudrate))?;
        Ok(())
    }

    /// Enables/Disables command echo
    pub fn set_echo(&mut self, enabled: bool) -> Result<Completion, Error> {
        if enabled {
            return self.execute(&EchoOnCommand);
        }

        self.execute(&EchoOffCommand)
    }

    /// Enables/Disables unvarnished transmission mode
    pub fn set_transfer_mode(&mut self, unvarnished: bool) -> Result<Completion, Error> {
        self.execute(&TransferModeCommand::new(unvarnished))
    }

    /// Processes all pending input without blocking. Unsolicited notices are handled, received
    /// socket data is buffered.
    pub fn process_pending(&mut self) {
        let deadline = self.link.deadline(0);

        loop {
            match self.link.has_input() {
                Ok(true) => {}
                Ok(false) => return,
                Err(error) => {
                    warn!("Checking for pending input failed: {:?}", error);
                    return;
                }
            }

            match self.pump(deadline) {
                Ok(_) => {}
                Err(Error::Timeout) => return,
                Err(error) => {
                    warn!("Processing pending input failed: {:?}", error);
                    return;
                }
            }
        }
    }

    /// Processes a single byte or data frame outside of command replies
    pub(crate) fn pump(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<Polled, Error> {
        let polled = self.link.poll(deadline)?;

        if let Polled::Byte(byte) = polled {
            self.link.consume();
            self.collect_notice(byte);
        }

        Ok(polled)
    }

    /// Collects notice lines and handles them once complete
    fn collect_notice(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                if let Some(notice) = Notice::parse(&self.line) {
                    self.handle_notice(notice);
                }
                self.line.clear();
            }
            b'\r' => {}
            _ => {
                if self.line.push(byte).is_err() {
                    self.line.clear();
                }
            }
        }
    }

    fn handle_notice(&mut self, notice: Notice) {
        debug!("Received notice {:?}", notice);

        match notice {
            Notice::LinkConnected(link_id) => {
                if self.registry.get(link_id).is_none() {
                    self.registry.insert(Connection {
                        link_id,
                        protocol: Protocol::Tcp,
                        remote: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
                        role: Role::Server,
                    });
                }
            }
            Notice::LinkClosed(link_id) => {
                self.registry.remove(link_id);
            }
            // Module restarted unexpectedly
            Notice::Ready => self.registry = Registry::new(),
            Notice::WifiConnected | Notice::WifiDisconnected | Notice::ReceivedIp | Notice::Unknown => {}
        }
    }

    /// Drops all link state
    fn reset_state(&mut self) {
        self.registry = Registry::new();
        self.link.inbound.clear();
        self.line.clear();
    }

    /// Writes the command line and returns the deadline of the command
    pub(crate) fn dispatch<Cmd: AtatCmd>(&mut self, command: &Cmd) -> Result<TimerInstantU32<TIMER_HZ>, Error> {
        self.process_pending();
        self.line.clear();

        self.link.write_command(command)?;
        let timeout = self.link.timeout_ms.max(Cmd::MAX_TIMEOUT_MS);
        Ok(self.link.deadline(timeout))
    }

    /// Reads the final status of the current command
    pub(crate) fn finish(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<Completion, Error> {
        self.link.read_status(deadline).into_result()
    }

    /// Writes the command and reads the final status
    pub(crate) fn execute<Cmd: AtatCmd>(&mut self, command: &Cmd) -> Result<Completion, Error> {
        let deadline = self.dispatch(command)?;
        self.finish(deadline)
    }

    /// Skips the reply up to the given prefix of a reply value. Returns [Error::Rejected] if the
    /// module answered with ERROR instead.
    pub(crate) fn seek(&mut self, prefix: &[u8], deadline: TimerInstantU32<TIMER_HZ>) -> Result<(), Error> {
        match self.link.find_strings(&[prefix, b"ERROR"], false, deadline)? {
            0 => Ok(()),
            _ => Err(Error::Rejected),
        }
    }

    /// Reads a quoted string value, whose opening quote was already consumed
    pub(crate) fn read_quoted<const N: usize>(
        &mut self,
        deadline: TimerInstantU32<TIMER_HZ>,
    ) -> Result<String<N>, Error> {
        let mut buffer = [0x0; N];
        let copied = self.link.read_until(&mut buffer, b"\"", deadline)?;

        if !copied.terminated {
            self.link.expect(b"\"", deadline)?;
        }

        let value = core::str::from_utf8(&buffer[..copied.length]).map_err(|_| Error::Invalid)?;
        String::try_from(value).map_err(|_| Error::Invalid)
    }
}
