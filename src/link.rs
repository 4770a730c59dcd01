//! # Serial link
//!
//! Timed byte access to the transport. This is the only place where time is measured, all
//! parsers are built on [Link::peek] and [Link::read].
//!
//! Both are the single choke point for inbound socket data: Whenever the next byte starts a
//! `+IPD,<id>,<len>:` frame, the frame is read completely into the buffer of the link before the
//! byte after the frame is returned. So no scanner is able to bypass frame handling.
use crate::inbound::Inbound;
use crate::registry::LinkId;
use crate::status::Error;
use atat::AtatCmd;
use embedded_io::{Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;
use heapless::Deque;

/// Header start of inbound socket data
const FRAME_PREFIX: &[u8] = b"+IPD,";

/// Max. encoded length of a single command line
const COMMAND_BUFFER_SIZE: usize = 192;

/// Result of a single poll
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Polled {
    /// Next byte of the reply stream, still unconsumed
    Byte(u8),

    /// A complete data frame for the given link was diverted to the inbound buffer
    Frame(LinkId),
}

/// Byte level access to the transport
pub struct Link<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> {
    /// Serial transport
    pub(crate) serial: S,

    /// Timer used for deadlines
    pub(crate) timer: T,

    /// Bytes already received but not consumed yet. Holds at most the frame prefix.
    pending: Deque<u8, 8>,

    /// Diverted socket data
    pub(crate) inbound: Inbound<RX_SIZE>,

    /// Default timeout in milliseconds. Also used for reading data frames.
    pub(crate) timeout_ms: u32,
}

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    Link<S, T, TIMER_HZ, RX_SIZE>
{
    pub(crate) fn new(serial: S, timer: T, timeout_ms: u32) -> Self {
        Self {
            serial,
            timer,
            pending: Deque::new(),
            inbound: Inbound::new(),
            timeout_ms,
        }
    }

    /// Returns the instant `timeout_ms` milliseconds from now
    pub(crate) fn deadline(&mut self, timeout_ms: u32) -> TimerInstantU32<TIMER_HZ> {
        self.timer.now() + TimerDurationU32::<TIMER_HZ>::millis(timeout_ms)
    }

    fn is_expired(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> bool {
        self.timer.now() >= deadline
    }

    /// Polls the transport until a byte is received or the deadline elapsed.
    /// The transport is checked at least once, so a deadline of now equals a single poll.
    fn receive(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<u8, Error> {
        loop {
            if self.serial.read_ready().map_err(|_| Error::Invalid)? {
                let mut byte = [0x0; 1];
                if self.serial.read(&mut byte).map_err(|_| Error::Invalid)? == 1 {
                    return Ok(byte[0]);
                }
            }

            if self.is_expired(deadline) {
                return Err(Error::Timeout);
            }
        }
    }

    /// Returns the next byte without consuming it. Data frames are not detected.
    pub(crate) fn timed_peek(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<u8, Error> {
        if let Some(byte) = self.pending.front() {
            return Ok(*byte);
        }

        let byte = self.receive(deadline)?;
        let _ = self.pending.push_back(byte);
        Ok(byte)
    }

    /// Consumes the next byte. Data frames are not detected.
    pub(crate) fn timed_read(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<u8, Error> {
        match self.pending.pop_front() {
            Some(byte) => Ok(byte),
            None => self.receive(deadline),
        }
    }

    /// Returns the next byte (unconsumed) or diverts a data frame
    pub(crate) fn poll(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<Polled, Error> {
        let byte = self.timed_peek(deadline)?;

        if byte == FRAME_PREFIX[0] && self.is_frame_ahead()? {
            return self.divert().map(Polled::Frame);
        }

        Ok(Polled::Byte(byte))
    }

    /// Returns the next byte without consuming it, diverting any data frames in front of it
    pub(crate) fn peek(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<u8, Error> {
        loop {
            if let Polled::Byte(byte) = self.poll(deadline)? {
                return Ok(byte);
            }
        }
    }

    /// Consumes the next byte, diverting any data frames in front of it
    pub(crate) fn read(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<u8, Error> {
        let byte = self.peek(deadline)?;
        self.pending.pop_front();
        Ok(byte)
    }

    /// Consumes the byte returned by the last [Link::poll]
    pub(crate) fn consume(&mut self) {
        self.pending.pop_front();
    }

    /// True if bytes are waiting to be consumed
    pub(crate) fn has_input(&mut self) -> Result<bool, Error> {
        if !self.pending.is_empty() {
            return Ok(true);
        }

        self.serial.read_ready().map_err(|_| Error::Invalid)
    }

    /// Checks if the pending bytes are the start of a data frame. Receives just as many bytes as
    /// needed for the decision.
    fn is_frame_ahead(&mut self) -> Result<bool, Error> {
        let deadline = self.deadline(self.timeout_ms);

        loop {
            if !self.pending.iter().zip(FRAME_PREFIX).all(|(byte, expected)| byte == expected) {
                return Ok(false);
            }

            if self.pending.len() >= FRAME_PREFIX.len() {
                return Ok(true);
            }

            match self.receive(deadline) {
                Ok(byte) => {
                    if self.pending.push_back(byte).is_err() {
                        return Ok(false);
                    }
                }
                Err(Error::Timeout) => return Ok(false),
                Err(error) => return Err(error),
            }
        }
    }

    /// Reads a data frame, whose prefix is pending, into the inbound buffer and returns the link ID
    ///
    /// The link ID is omitted by the module if multiple connections are disabled, in this case the data
    /// is assigned to link 0.
    fn divert(&mut self) -> Result<LinkId, Error> {
        let deadline = self.deadline(self.timeout_ms);

        for _ in 0..FRAME_PREFIX.len() {
            self.pending.pop_front();
        }

        let first = self.read_frame_number(deadline)?;
        let (link_id, length) = match self.timed_read(deadline)? {
            b',' => {
                let length = self.read_frame_number(deadline)?;
                if self.timed_read(deadline)? != b':' {
                    return Err(Error::Invalid);
                }

                (first, length)
            }
            b':' => (0, first),
            _ => return Err(Error::Invalid),
        };

        debug!("Receiving {} bytes of link {}", length, link_id);
        let mut dropped = 0;

        for _ in 0..length {
            let byte = self.timed_read(deadline)?;
            if !self.inbound.push(link_id, byte) {
                dropped += 1;
            }
        }

        if dropped > 0 {
            warn!("Dropped {} bytes of link {}, buffer full or invalid link", dropped, link_id);
        }

        Ok(link_id)
    }

    /// Decimal number of a frame header
    fn read_frame_number(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<usize, Error> {
        let mut value: usize = 0;
        let mut digits = 0;

        loop {
            let byte = self.timed_peek(deadline)?;
            if !byte.is_ascii_digit() {
                break;
            }

            self.pending.pop_front();
            digits += 1;
            value = value
                .checked_mul(10)
                .and_then(|value| value.checked_add((byte - b'0') as usize))
                .ok_or(Error::Invalid)?;
        }

        if digits == 0 {
            return Err(Error::Invalid);
        }

        Ok(value)
    }

    /// Discards all input, until the module stays silent for `quiet_ms` or the default timeout elapsed.
    /// Data frames are discarded as well.
    pub(crate) fn clear(&mut self, quiet_ms: u32) {
        let limit = self.deadline(self.timeout_ms);
        self.pending.clear();

        while !self.is_expired(limit) {
            let deadline = self.deadline(quiet_ms);
            if self.receive(deadline).is_err() {
                break;
            }
        }
    }

    /// Encodes and writes a command line
    pub(crate) fn write_command<Cmd: AtatCmd>(&mut self, command: &Cmd) -> Result<(), Error> {
        let mut buffer = [0x0; COMMAND_BUFFER_SIZE];
        let length = command.write(&mut buffer);

        debug!(
            "Sending command {}",
            core::str::from_utf8(&buffer[..length]).unwrap_or("<binary>").trim_end()
        );
        self.write_data(&buffer[..length])
    }

    /// Writes raw bytes
    pub(crate) fn write_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.serial.write_all(data).map_err(|_| Error::Rejected)?;
        self.serial.flush().map_err(|_| Error::Rejected)
    }
}
