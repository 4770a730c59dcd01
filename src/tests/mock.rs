use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer as FugitTimer;
use mockall::mock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Scripted serial transport. Queued responses are released one by one on each flush, so the
/// n-th flushed command is answered by the n-th response.
pub struct MockSerial {
    /// Bytes readable by the driver
    input: VecDeque<u8>,

    /// Mocked responses which get released in the same order as inserted
    responses: VecDeque<Vec<u8>>,

    /// Bytes written since the last flush
    written: Vec<u8>,

    /// Flushed commands
    commands: Vec<Vec<u8>>,

    /// Simulates a broken transport on read
    fail_read: bool,

    /// Simulates a broken transport on write
    fail_write: bool,
}

#[derive(Debug)]
pub struct MockError;

impl embedded_io::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            responses: VecDeque::new(),
            written: vec![],
            commands: vec![],
            fail_read: false,
            fail_write: false,
        }
    }

    /// Adds a mock response, released on the next unanswered flush
    pub fn add_response(&mut self, response: &[u8]) {
        self.responses.push_back(response.to_vec());
    }

    /// Simulates a plain OK response
    pub fn add_ok_response(&mut self) {
        self.add_response(b"\r\nOK\r\n");
    }

    /// Simulates a general error response
    pub fn add_error_response(&mut self) {
        self.add_response(b"\r\nERROR\r\n");
    }

    /// Adds bytes which are readable immediately, e.g. unsolicited messages
    pub fn add_input(&mut self, input: &[u8]) {
        self.input.extend(input.iter());
    }

    pub fn fail_read(&mut self) {
        self.fail_read = true;
    }

    pub fn fail_write(&mut self) {
        self.fail_write = true;
    }

    /// Bytes written but not flushed yet
    pub fn get_unflushed(&self) -> &[u8] {
        &self.written
    }

    /// Returns a copy of the flushed commands
    pub fn get_commands_as_strings(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| String::from_utf8(command.clone()).unwrap())
            .collect()
    }

    /// Returns the last flushed command
    pub fn last_command(&self) -> String {
        self.get_commands_as_strings().pop().unwrap()
    }

    /// Number of input bytes not read by the driver
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl ErrorType for MockSerial {
    type Error = MockError;
}

impl Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_read {
            return Err(MockError);
        }

        let mut length = 0;
        while length < buf.len() {
            match self.input.pop_front() {
                Some(byte) => buf[length] = byte,
                None => break,
            }
            length += 1;
        }

        Ok(length)
    }
}

impl ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        if self.fail_read {
            return Err(MockError);
        }

        Ok(!self.input.is_empty())
    }
}

impl Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_write {
            return Err(MockError);
        }

        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.fail_write {
            return Err(MockError);
        }

        self.commands.push(std::mem::take(&mut self.written));
        if let Some(response) = self.responses.pop_front() {
            self.input.extend(response);
        }

        Ok(())
    }
}

mock! {
    pub Timer{}

    impl FugitTimer<1_000_000> for Timer {
        type Error = u32;

        fn now(&mut self) -> TimerInstantU32<1000000>;
        fn start(&mut self, duration: TimerDurationU32<1000000>) -> Result<(), u32>;
        fn cancel(&mut self) -> Result<(), u32>;
        fn wait(&mut self) -> nb::Result<(), u32>;
    }
}

impl MockTimer {
    /// Timer whose clock advances by one millisecond on every `now()` call
    pub fn ticking() -> Self {
        Self::counting(Arc::new(AtomicU32::new(0)))
    }

    /// Same as [MockTimer::ticking], counting the `now()` calls
    pub fn counting(calls: Arc<AtomicU32>) -> Self {
        let mut timer = MockTimer::new();
        let mut ticks: u32 = 0;

        timer.expect_now().returning(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            ticks = ticks.wrapping_add(1_000);
            TimerInstantU32::from_ticks(ticks)
        });

        timer
    }
}
