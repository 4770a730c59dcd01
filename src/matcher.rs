//! Streaming literal matching
use crate::link::Link;
use crate::status::Error;
use embedded_io::{Read, ReadReady, Write};
use fugit::TimerInstantU32;
use fugit_timer::Timer;
use heapless::Vec;

/// Max. number of literals matched simultaneously
const MAX_CANDIDATES: usize = 8;

/// Streaming substring matcher for a single literal
#[derive(Clone, Debug)]
pub(crate) struct Needle<'a> {
    target: &'a [u8],

    /// Length of the target prefix matching the end of the stream so far
    matched: usize,
}

impl<'a> Needle<'a> {
    pub fn new(target: &'a [u8]) -> Self {
        Self { target, matched: 0 }
    }

    /// Feeds the next byte. Returns true if the prefix got extended by the byte.
    ///
    /// On mismatch, falls back to the longest target prefix which is a suffix of the stream, so
    /// overlapping occurrences (e.g. `\r\n\r\nOK` in `\r\n\r\n\r\nOK`) are not missed.
    pub fn feed(&mut self, byte: u8) -> bool {
        if self.is_complete() {
            self.matched = 0;
        }

        if self.target.get(self.matched) == Some(&byte) {
            self.matched += 1;
            return true;
        }

        // Stream end equals target[..matched] + byte
        let end = self.matched;
        self.matched = (1..=end)
            .rev()
            .find(|&length| {
                let start = end + 1 - length;
                self.target[..length - 1] == self.target[start..end] && self.target[length - 1] == byte
            })
            .unwrap_or(0);

        false
    }

    pub fn is_complete(&self) -> bool {
        !self.target.is_empty() && self.matched == self.target.len()
    }
}

/// Result of [Link::read_until]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Copied {
    /// Number of bytes placed in buffer, excluding the target
    pub length: usize,

    /// True if reading stopped as the target was matched
    pub terminated: bool,

    /// Index of the matched target. Zero if not terminated.
    pub target: usize,
}

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    Link<S, T, TIMER_HZ, RX_SIZE>
{
    /// Reads until the target literal is matched. Returns false if the deadline elapsed before.
    pub(crate) fn find(&mut self, target: &[u8], deadline: TimerInstantU32<TIMER_HZ>) -> Result<bool, Error> {
        let mut needle = Needle::new(target);

        while !needle.is_complete() {
            match self.read(deadline) {
                Ok(byte) => needle.feed(byte),
                Err(Error::Timeout) => return Ok(false),
                Err(error) => return Err(error),
            };
        }

        Ok(true)
    }

    /// Copies bytes to the buffer until either the target is matched, the buffer is full or the
    /// deadline elapsed. The matched target is consumed, but not copied.
    pub(crate) fn read_until(
        &mut self,
        buffer: &mut [u8],
        target: &[u8],
        deadline: TimerInstantU32<TIMER_HZ>,
    ) -> Result<Copied, Error> {
        self.read_until_any(buffer, &[target], deadline)
    }

    /// Same as [Link::read_until], but stops at whichever target is matched first
    pub(crate) fn read_until_any(
        &mut self,
        buffer: &mut [u8],
        targets: &[&[u8]],
        deadline: TimerInstantU32<TIMER_HZ>,
    ) -> Result<Copied, Error> {
        if targets.len() > MAX_CANDIDATES {
            return Err(Error::Invalid);
        }

        let mut needles: Vec<Needle, MAX_CANDIDATES> = targets.iter().map(|target| Needle::new(target)).collect();
        let mut length = 0;

        while length < buffer.len() {
            let byte = match self.read(deadline) {
                Ok(byte) => byte,
                Err(Error::Timeout) => break,
                Err(error) => return Err(error),
            };

            for needle in needles.iter_mut() {
                needle.feed(byte);
            }

            if let Some(index) = needles.iter().position(|needle| needle.is_complete()) {
                // The target bytes in front of the current one were already copied
                return Ok(Copied {
                    length: length.saturating_sub(targets[index].len() - 1),
                    terminated: true,
                    target: index,
                });
            }

            buffer[length] = byte;
            length += 1;
        }

        Ok(Copied {
            length,
            terminated: false,
            target: 0,
        })
    }

    /// Matches all candidates simultaneously and returns the index of the first complete match.
    ///
    /// If strict is set, every byte needs to extend the prefix of at least one candidate, otherwise
    /// [Error::Invalid] is returned. The offending byte is consumed.
    pub(crate) fn find_strings(
        &mut self,
        candidates: &[&[u8]],
        strict: bool,
        deadline: TimerInstantU32<TIMER_HZ>,
    ) -> Result<usize, Error> {
        if candidates.len() > MAX_CANDIDATES {
            return Err(Error::Invalid);
        }

        let mut needles: Vec<Needle, MAX_CANDIDATES> = candidates.iter().map(|target| Needle::new(target)).collect();

        loop {
            let byte = self.read(deadline)?;
            let mut extended = false;

            for needle in needles.iter_mut() {
                extended |= needle.feed(byte);
            }

            if let Some(index) = needles.iter().position(|needle| needle.is_complete()) {
                return Ok(index);
            }

            if strict && !extended {
                return Err(Error::Invalid);
            }
        }
    }

    /// Strictly consumes the given literal
    pub(crate) fn expect(&mut self, literal: &[u8], deadline: TimerInstantU32<TIMER_HZ>) -> Result<(), Error> {
        self.find_strings(&[literal], true, deadline)?;
        Ok(())
    }
}
