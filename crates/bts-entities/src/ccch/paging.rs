use std::collections::VecDeque;

use bts_core::GsmTime;

/// Source of paging messages for the shared CCCH
pub trait PagingGenerator {
    /// Writes a paging message for `gt` into `out`.
    /// Returns the number of bytes written, or None if there is nothing to page.
    fn gen_msg(&mut self, out: &mut [u8], gt: GsmTime) -> Option<usize>;
}

/// Simple FIFO of pre-encoded paging requests, bounded in size
#[derive(Debug)]
pub struct PagingQueue {
    queue: VecDeque<Vec<u8>>,
    capacity: usize,
}

impl PagingQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity,
        }
    }

    /// Returns the message back if the queue is full
    pub fn add(&mut self, msg: Vec<u8>) -> Result<(), Vec<u8>> {
        if self.queue.len() >= self.capacity {
            tracing::warn!("paging queue full ({}), dropping request", self.capacity);
            return Err(msg);
        }
        self.queue.push_back(msg);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Free entries, reported in the CCCH load indication
    pub fn buffer_space(&self) -> usize {
        self.capacity.saturating_sub(self.queue.len())
    }
}

impl PagingGenerator for PagingQueue {
    fn gen_msg(&mut self, out: &mut [u8], _gt: GsmTime) -> Option<usize> {
        let msg = self.queue.pop_front()?;
        let len = msg.len().min(out.len());
        if len < msg.len() {
            tracing::warn!("paging message of {} bytes truncated to {}", msg.len(), len);
        }
        out[..len].copy_from_slice(&msg[..len]);
        Some(len)
    }
}
