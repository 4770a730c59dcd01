//! # Shared access
//!
//! The adapter is not reentrant. [SharedAdapter] serializes access from multiple execution
//! contexts (e.g. main loop and interrupt handlers) by a critical section mutex.
//!
//! ## Example
//!
//! ````
//! # use esp8266_at::adapter::Adapter;
//! # use esp8266_at::example::{ExampleSerial, ExampleTimer};
//! # use esp8266_at::shared::SharedAdapter;
//! #
//! let adapter: Adapter<_, _, 1_000_000, 256> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//! let shared = SharedAdapter::new(adapter);
//!
//! shared.lock(|adapter| adapter.begin()).unwrap();
//! ````
use crate::adapter::Adapter;
use core::cell::RefCell;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_io::{Read, ReadReady, Write};
use fugit_timer::Timer;

/// Adapter guarded by a critical section mutex
pub struct SharedAdapter<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
{
    inner: Mutex<CriticalSectionRawMutex, RefCell<Adapter<S, T, TIMER_HZ, RX_SIZE>>>,
}

impl<S: Read + Write + ReadReady, T: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>
    SharedAdapter<S, T, TIMER_HZ, RX_SIZE>
{
    pub fn new(adapter: Adapter<S, T, TIMER_HZ, RX_SIZE>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(adapter)),
        }
    }

    /// Runs the closure with exclusive access to the adapter.
    ///
    /// Interrupts are disabled for the whole duration, including blocking reads of the adapter.
    /// Calling `lock` again inside the closure panics.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Adapter<S, T, TIMER_HZ, RX_SIZE>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Returns the guarded adapter
    pub fn into_inner(self) -> Adapter<S, T, TIMER_HZ, RX_SIZE> {
        self.inner.into_inner().into_inner()
    }
}
