//! Mocks for doc examples
use core::convert::Infallible;
use embedded_io::{ErrorType, Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;
use heapless::{Deque, Vec};

/// Serial mock answering a fixed set of commands. Replies are queued on flush.
#[derive(Default)]
pub struct ExampleSerial {
    /// Reply bytes not read yet
    input: Deque<u8, 512>,

    /// Bytes written since the last flush
    command: Vec<u8, 128>,
}

impl ExampleSerial {
    fn reply(&mut self, reply: &[u8]) {
        for byte in reply {
            let _ = self.input.push_back(*byte);
        }
    }
}

impl ErrorType for ExampleSerial {
    type Error = Infallible;
}

impl Read for ExampleSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut length = 0;

        for slot in buf.iter_mut() {
            match self.input.pop_front() {
                Some(byte) => *slot = byte,
                None => break,
            }
            length += 1;
        }

        Ok(length)
    }
}

impl ReadReady for ExampleSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.input.is_empty())
    }
}

impl Write for ExampleSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let _ = self.command.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        let reply: &[u8] = match self.command.as_slice() {
            b"AT\r\n" | b"ATE0\r\n" | b"AT+CIPMODE=0\r\n" | b"AT+CWMODE=1\r\n" | b"AT+CIPMUX=1\r\n" => b"\r\nOK\r\n",
            b"AT+CWJAP=\"test_wifi\",\"secret\"\r\n" => b"WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n",
            b"AT+CIPMUX?\r\n" => b"+CIPMUX:0\r\n\r\nOK\r\n",
            b"AT+CIPSTA?\r\n" => b"+CIPSTA:\"10.0.0.181\"\r\n\r\nOK\r\n",
            b"AT+CIPSTAMAC?\r\n" => b"+CIPSTAMAC:\"10:fe:ed:05:ba:50\"\r\n\r\nOK\r\n",
            b"AT+CIPSTART=0,\"TCP\",\"10.0.0.1\",21\r\n" => b"0,CONNECT\r\n\r\nOK\r\n",
            b"AT+CIPSEND=0,6\r\n" => b"\r\nOK\r\n> ",
            b"hallo!" => b"\r\nRecv 6 bytes\r\n\r\nSEND OK\r\n\r\n+IPD,0,16:nice to see you!",
            b"AT+CIPCLOSE=0\r\n" => b"0,CLOSED\r\n\r\nOK\r\n",
            _ => b"\r\nERROR\r\n",
        };

        self.reply(reply);
        self.command.clear();
        Ok(())
    }
}

/// Timer mock. Every call of `now()` advances the clock by one millisecond.
#[derive(Default)]
pub struct ExampleTimer {
    ticks: u32,
}

impl Timer<1_000_000> for ExampleTimer {
    type Error = u32;

    fn now(&mut self) -> TimerInstantU32<1000000> {
        self.ticks = self.ticks.wrapping_add(1_000);
        TimerInstantU32::from_ticks(self.ticks)
    }

    fn start(&mut self, _duration: TimerDurationU32<1000000>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        nb::Result::Err(nb::Error::WouldBlock)
    }
}
