use crate::registry::{LinkId, MAX_LINKS};
use heapless::Deque;

/// Socket data received by `+IPD` frames, buffered per link until drained
pub(crate) struct Inbound<const RX_SIZE: usize> {
    /// Array index = link_id
    queues: [Deque<u8, RX_SIZE>; MAX_LINKS],
}

impl<const RX_SIZE: usize> Inbound<RX_SIZE> {
    pub fn new() -> Self {
        Self {
            queues: core::array::from_fn(|_| Deque::new()),
        }
    }

    /// Appends a received byte. Returns false if the byte got dropped, as buffer is full or link ID is out of range.
    pub fn push(&mut self, link_id: LinkId, byte: u8) -> bool {
        match self.queues.get_mut(link_id) {
            Some(queue) => queue.push_back(byte).is_ok(),
            None => false,
        }
    }

    /// Number of buffered bytes of the given link
    pub fn available(&self, link_id: LinkId) -> usize {
        self.queues.get(link_id).map_or(0, |queue| queue.len())
    }

    /// Lowest link ID with buffered data
    pub fn next_available(&self) -> Option<LinkId> {
        self.queues.iter().position(|queue| !queue.is_empty())
    }

    pub fn pop(&mut self, link_id: LinkId) -> Option<u8> {
        self.queues.get_mut(link_id)?.pop_front()
    }

    /// Moves buffered bytes to the given buffer and returns the moved length
    pub fn drain_into(&mut self, link_id: LinkId, buffer: &mut [u8]) -> usize {
        let mut length = 0;

        for slot in buffer.iter_mut() {
            match self.pop(link_id) {
                Some(byte) => *slot = byte,
                None => break,
            }
            length += 1;
        }

        length
    }

    /// Drops all buffered data
    pub fn clear(&mut self) {
        self.queues.iter_mut().for_each(|queue| queue.clear());
    }
}
