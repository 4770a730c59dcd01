//! Token scanners for the reply grammar
//!
//! Scanners consume bytes until their grammar is satisfied. Bytes consumed before a failure are
//! lost, so any scanner error corrupts the rest of the reply.
use crate::link::Link;
use crate::registry::{Protocol, Role};
use crate::status::Error;
use embedded_io::{Read, ReadReady, Write};
use embedded_nal::Ipv4Addr;
use fugit::TimerInstantU32;
use fugit_timer::Timer;

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    Link<S, T, TIMER_HZ, RX_SIZE>
{
    /// Parses a decimal integer with optional leading `-`.
    /// The first non-digit byte is peeked but not consumed, so the caller may inspect the delimiter.
    pub(crate) fn parse_int(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<i32, Error> {
        let negative = if self.peek(deadline)? == b'-' {
            self.read(deadline)?;
            true
        } else {
            false
        };

        let mut value: i32 = 0;
        let mut digits = 0;

        loop {
            let byte = match self.peek(deadline) {
                Ok(byte) => byte,
                // Number may be the last token of the stream
                Err(Error::Timeout) if digits > 0 => break,
                Err(error) => return Err(error),
            };

            if !byte.is_ascii_digit() {
                break;
            }

            self.read(deadline)?;
            digits += 1;
            value = value
                .checked_mul(10)
                .and_then(|value| value.checked_add((byte - b'0') as i32))
                .ok_or(Error::Invalid)?;
        }

        if digits == 0 {
            return Err(Error::Invalid);
        }

        Ok(if negative { -value } else { value })
    }

    /// Parses an unsigned integer in the given range
    pub(crate) fn parse_bounded(
        &mut self,
        max: u32,
        deadline: TimerInstantU32<TIMER_HZ>,
    ) -> Result<u32, Error> {
        let value = self.parse_int(deadline)?;

        if value < 0 || value as u32 > max {
            return Err(Error::Invalid);
        }

        Ok(value as u32)
    }

    /// Parses exactly two hex characters as one byte
    pub(crate) fn parse_hex(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<u8, Error> {
        let high = self.parse_hex_digit(deadline)?;
        let low = self.parse_hex_digit(deadline)?;

        Ok(high << 4 | low)
    }

    fn parse_hex_digit(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<u8, Error> {
        let value = base16::decode_byte(self.peek(deadline)?).ok_or(Error::Invalid)?;
        self.read(deadline)?;
        Ok(value)
    }

    /// Parses a dotted-decimal IPv4 address
    pub(crate) fn parse_ip(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<Ipv4Addr, Error> {
        let mut octets = [0x0; 4];

        for (index, octet) in octets.iter_mut().enumerate() {
            if index > 0 {
                self.expect_separator(b".", deadline)?;
            }

            *octet = self.parse_bounded(u8::MAX as u32, deadline)? as u8;
        }

        Ok(Ipv4Addr::from(octets))
    }

    /// Parses a MAC address of six hex pairs, separated either by `:` or `-`
    pub(crate) fn parse_mac(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<[u8; 6], Error> {
        let mut mac = [0x0; 6];

        for (index, byte) in mac.iter_mut().enumerate() {
            if index > 0 {
                self.expect_separator(b":-", deadline)?;
            }

            *byte = self.parse_hex(deadline)?;
        }

        Ok(mac)
    }

    /// Consumes the next byte, which must be one of the given separators
    fn expect_separator(&mut self, separators: &[u8], deadline: TimerInstantU32<TIMER_HZ>) -> Result<(), Error> {
        if !separators.contains(&self.peek(deadline)?) {
            return Err(Error::Invalid);
        }

        self.read(deadline)?;
        Ok(())
    }

    /// Matches the literal `TCP` or `UDP`
    pub(crate) fn parse_protocol(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<Protocol, Error> {
        match self.find_strings(&[b"TCP", b"UDP"], true, deadline)? {
            0 => Ok(Protocol::Tcp),
            _ => Ok(Protocol::Udp),
        }
    }

    /// Parses the connection role. `0`: client, `1`: server
    pub(crate) fn parse_role(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<Role, Error> {
        Role::from_code(self.parse_int(deadline)?)
    }

    /// Consumes CR and LF bytes in front of the next token
    pub(crate) fn skip_line_breaks(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> Result<(), Error> {
        while matches!(self.peek(deadline)?, b'\r' | b'\n') {
            self.read(deadline)?;
        }

        Ok(())
    }
}
