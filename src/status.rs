//! # Command outcomes
//!
//! Every dispatched command reduces to exactly one [CommandStatus]. The public API splits it into
//! the success part ([Completion]) and the failure part ([Error]).
use crate::link::Link;
use embedded_io::{Read, ReadReady, Write};
use fugit::TimerInstantU32;
use fugit_timer::Timer;

/// Outcome of a single dispatched command
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandStatus {
    /// Command was accepted
    Ok,

    /// Command was a no-op, e.g. setting a mode which is already active
    NoChange,

    /// Module rejected the command
    Error,

    /// Command referenced a link which is not open
    NoLink,

    /// No terminator was received before the deadline elapsed
    Timeout,

    /// Argument exceeds the line length limit of the module. Nothing was transmitted.
    TooLong,

    /// Malformed or unexpected reply
    Invalid,
}

/// Successful outcome of a command
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// Module answered with `OK`
    Ok,

    /// Module answered with `no change`
    NoChange,
}

/// Failed outcome of a command
///
/// A failed command leaves the connection registry and inbound buffers consistent. However after
/// [Error::Timeout] or [Error::Invalid] the reply may not have been consumed completely, so the
/// stream is only guaranteed to be positioned at or past the start of that reply. Issuing a
/// benign command like [test()](crate::adapter::Adapter::test) resynchronizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Module answered with `ERROR` or `FAIL`, or the command could not be written
    Rejected,

    /// Link is not open or link ID is out of range
    NoLink,

    /// Deadline elapsed before the expected reply arrived
    Timeout,

    /// Argument is too long. Zero bytes were written to the transport.
    TooLong,

    /// Reply does not match the expected grammar
    Invalid,
}

impl CommandStatus {
    /// Splits the status in success and failure
    pub fn into_result(self) -> Result<Completion, Error> {
        match self {
            CommandStatus::Ok => Ok(Completion::Ok),
            CommandStatus::NoChange => Ok(Completion::NoChange),
            CommandStatus::Error => Err(Error::Rejected),
            CommandStatus::NoLink => Err(Error::NoLink),
            CommandStatus::Timeout => Err(Error::Timeout),
            CommandStatus::TooLong => Err(Error::TooLong),
            CommandStatus::Invalid => Err(Error::Invalid),
        }
    }

    /// True for [CommandStatus::Ok] and [CommandStatus::NoChange]
    pub fn is_success(&self) -> bool {
        matches!(self, CommandStatus::Ok | CommandStatus::NoChange)
    }
}

impl From<Error> for CommandStatus {
    fn from(error: Error) -> Self {
        match error {
            Error::Rejected => CommandStatus::Error,
            Error::NoLink => CommandStatus::NoLink,
            Error::Timeout => CommandStatus::Timeout,
            Error::TooLong => CommandStatus::TooLong,
            Error::Invalid => CommandStatus::Invalid,
        }
    }
}

impl From<Completion> for CommandStatus {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Ok => CommandStatus::Ok,
            Completion::NoChange => CommandStatus::NoChange,
        }
    }
}

/// Final reply literals. Order matters, index is mapped by [Link::read_status].
const TERMINATORS: [&[u8]; 6] = [b"OK", b"ERROR", b"no change", b"link is not valid", b"busy", b"FAIL"];

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    Link<S, T, TIMER_HZ, RX_SIZE>
{
    /// Reads until a final reply literal is received and classifies it.
    ///
    /// `busy` is no final reply, the module is still processing the previous command. So reading
    /// continues until a final literal arrives or the deadline elapses.
    pub(crate) fn read_status(&mut self, deadline: TimerInstantU32<TIMER_HZ>) -> CommandStatus {
        loop {
            let status = match self.find_strings(&TERMINATORS, false, deadline) {
                Ok(0) => CommandStatus::Ok,
                Ok(1) | Ok(5) => CommandStatus::Error,
                Ok(2) => CommandStatus::NoChange,
                Ok(3) => CommandStatus::NoLink,
                Ok(4) => {
                    debug!("Module is busy, waiting for final reply");
                    continue;
                }
                Ok(_) => CommandStatus::Invalid,
                Err(error) => error.into(),
            };

            trace!("Received status {:?}", status);
            return status;
        }
    }
}
