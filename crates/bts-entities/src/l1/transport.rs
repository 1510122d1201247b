use std::collections::VecDeque;
use std::io;
use std::os::unix::io::RawFd;

use bts_config::CfgL1;
use bts_core::bts_entities::BtsEntity;
use bts_saps::l1::{L1PrimInd, L1PrimKind, L1Queue};
use thiserror::Error;

use super::device::{DeviceOpener, L1Device};
use super::msg_queue::{dev_paths, prim_size, queues_for};
use crate::fdset::{FdRegistry, FdToken, Interest};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0} queue does not exist on this hardware")]
    Unsupported(L1Queue),
    #[error("unable to open msg_queue {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("unable to register {queue} msg_queue: {source}")]
    Register {
        queue: L1Queue,
        #[source]
        source: io::Error,
    },
    #[error("error reading from {queue} msg_queue: {source}")]
    Read {
        queue: L1Queue,
        #[source]
        source: io::Error,
    },
    #[error("error writing to {queue} msg_queue: {source}")]
    Write {
        queue: L1Queue,
        #[source]
        source: io::Error,
    },
    #[error("short write to {queue} msg_queue: {written} < {len}")]
    ShortWrite { queue: L1Queue, written: usize, len: usize },
    #[error("{0} msg_queue is closed")]
    Closed(L1Queue),
    #[error("{0} write queue full")]
    QueueFull(L1Queue),
    #[error("{found} != sizeof({kind:?}) = {expected} on {queue} msg_queue")]
    Framing {
        queue: L1Queue,
        kind: L1PrimKind,
        expected: usize,
        found: usize,
    },
}

/// Direction of a registered queue descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdDir {
    Read,
    Write,
}

/// Token id for a queue descriptor: two ids per queue
pub fn token_id(queue: L1Queue, dir: FdDir) -> u32 {
    let base = queue.index() as u32 * 2;
    match dir {
        FdDir::Read => base,
        FdDir::Write => base + 1,
    }
}

pub fn decode_token(id: u32) -> Option<(L1Queue, FdDir)> {
    let queue = *L1Queue::ALL.get((id / 2) as usize)?;
    let dir = if id % 2 == 0 { FdDir::Read } else { FdDir::Write };
    Some((queue, dir))
}

struct OpenQueue {
    read: Box<dyn L1Device>,
    write: Box<dyn L1Device>,
    pending: VecDeque<Vec<u8>>,
}

impl OpenQueue {
    fn read_fd(&self) -> RawFd {
        self.read.raw_fd()
    }

    fn write_fd(&self) -> RawFd {
        self.write.raw_fd()
    }
}

/// Read and write endpoints of the DSP message queues.
/// A queue is either fully open (both endpoints registered) or closed.
pub struct L1Transport {
    cfg: CfgL1,
    opener: Box<dyn DeviceOpener>,
    queues: [Option<OpenQueue>; 4],
    read_buf: Vec<u8>,
}

impl L1Transport {
    pub fn new(cfg: CfgL1, opener: Box<dyn DeviceOpener>) -> Self {
        let read_buf = vec![0u8; cfg.read_buf_size()];
        Self {
            cfg,
            opener,
            queues: [None, None, None, None],
            read_buf,
        }
    }

    pub fn is_open(&self, queue: L1Queue) -> bool {
        self.queues[queue.index()].is_some()
    }

    pub fn pending_len(&self, queue: L1Queue) -> usize {
        self.queues[queue.index()].as_ref().map_or(0, |q| q.pending.len())
    }

    /// Opens both endpoints of `queue` and registers them.
    /// On failure nothing stays open or registered.
    pub fn open(&mut self, queue: L1Queue, fds: &mut dyn FdRegistry) -> Result<(), TransportError> {
        if !queues_for(self.cfg.hw_variant).contains(&queue) {
            return Err(TransportError::Unsupported(queue));
        }
        if self.is_open(queue) {
            tracing::warn!("{} msg_queue already open", queue);
            return Ok(());
        }
        let (rd_path, wr_path) = dev_paths(&self.cfg, queue).ok_or(TransportError::Unsupported(queue))?;

        let read = self.opener.open_read(&rd_path).map_err(|source| TransportError::Open {
            path: rd_path.display().to_string(),
            source,
        })?;
        let read_token = FdToken {
            entity: BtsEntity::L1If,
            id: token_id(queue, FdDir::Read),
        };
        fds.register(read.raw_fd(), read_token, Interest::READ)
            .map_err(|source| TransportError::Register { queue, source })?;

        let write = match self.opener.open_write(&wr_path) {
            Ok(write) => write,
            Err(source) => {
                // Roll back the read side
                fds.unregister(read.raw_fd());
                return Err(TransportError::Open {
                    path: wr_path.display().to_string(),
                    source,
                });
            }
        };
        let write_token = FdToken {
            entity: BtsEntity::L1If,
            id: token_id(queue, FdDir::Write),
        };
        // No write interest until something is queued
        if let Err(source) = fds.register(write.raw_fd(), write_token, Interest::NONE) {
            fds.unregister(read.raw_fd());
            return Err(TransportError::Register { queue, source });
        }

        tracing::info!("opened {} msg_queue", queue);
        self.queues[queue.index()] = Some(OpenQueue {
            read,
            write,
            pending: VecDeque::with_capacity(self.cfg.write_queue_depth),
        });
        Ok(())
    }

    /// Unregisters and closes both endpoints. Closing a closed queue does nothing.
    /// Returns true if the queue was open.
    pub fn close(&mut self, queue: L1Queue, fds: &mut dyn FdRegistry) -> bool {
        let Some(q) = self.queues[queue.index()].take() else {
            return false;
        };
        fds.unregister(q.read_fd());
        fds.unregister(q.write_fd());
        if !q.pending.is_empty() {
            tracing::debug!("{} msg_queue closed with {} pending primitives", queue, q.pending.len());
        }
        tracing::info!("closed {} msg_queue", queue);
        true
    }

    /// Queues a primitive for writing and enables write notification
    pub fn enqueue(&mut self, queue: L1Queue, prim: Vec<u8>, fds: &mut dyn FdRegistry) -> Result<(), TransportError> {
        let depth = self.cfg.write_queue_depth;
        let q = self.queues[queue.index()].as_mut().ok_or(TransportError::Closed(queue))?;
        if q.pending.len() >= depth {
            return Err(TransportError::QueueFull(queue));
        }
        q.pending.push_back(prim);
        fds.set_interest(q.write_fd(), Interest::WRITE)
            .map_err(|source| TransportError::Register { queue, source })
    }

    /// Reads up to `read_batch` primitives and hands each to `dispatch`, in read order.
    /// Stops early when the device has no more data, reports EOF or fails.
    /// A primitive of the wrong size is returned as an error and never dispatched.
    pub fn on_read_ready(&mut self, queue: L1Queue, dispatch: &mut dyn FnMut(L1PrimInd)) -> Result<usize, TransportError> {
        let expected = prim_size(&self.cfg, queue);
        let kind = queue.prim_kind();
        let mut count = 0;

        while count < self.cfg.read_batch {
            let q = self.queues[queue.index()].as_mut().ok_or(TransportError::Closed(queue))?;
            let len = match q.read.read(&mut self.read_buf) {
                Ok(0) => break,
                Ok(len) => len,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::Interrupted => break,
                Err(source) => return Err(TransportError::Read { queue, source }),
            };
            count += 1;

            if len != expected {
                return Err(TransportError::Framing {
                    queue,
                    kind,
                    expected,
                    found: len,
                });
            }
            dispatch(L1PrimInd {
                queue,
                kind,
                data: self.read_buf[..len].to_vec(),
            });
        }
        Ok(count)
    }

    /// Writes the next pending primitive with a single write call.
    /// Write notification is switched off once nothing is pending.
    pub fn on_write_ready(&mut self, queue: L1Queue, fds: &mut dyn FdRegistry) -> Result<(), TransportError> {
        let q = self.queues[queue.index()].as_mut().ok_or(TransportError::Closed(queue))?;

        let result = match q.pending.pop_front() {
            None => Ok(()),
            Some(prim) => match q.write.write(&prim) {
                Ok(written) if written < prim.len() => Err(TransportError::ShortWrite {
                    queue,
                    written,
                    len: prim.len(),
                }),
                Ok(_) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    q.pending.push_front(prim);
                    Ok(())
                }
                Err(source) => Err(TransportError::Write { queue, source }),
            },
        };

        if q.pending.is_empty() {
            // Best effort, the fd is known to be registered while the queue is open
            let _ = fds.set_interest(q.write_fd(), Interest::NONE);
        }
        result
    }
}
