use std::collections::HashMap;
use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use bts_core::bts_entities::BtsEntity;

/// Identifies who gets called when a descriptor becomes ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FdToken {
    pub entity: BtsEntity,
    pub id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interest {
    pub read: bool,
    pub write: bool,
}

impl Interest {
    pub const READ: Interest = Interest { read: true, write: false };
    pub const WRITE: Interest = Interest { read: false, write: true };
    pub const NONE: Interest = Interest { read: false, write: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub token: FdToken,
    pub readable: bool,
    pub writable: bool,
    /// Error or hangup reported by the kernel
    pub hangup: bool,
}

/// Readiness notification for file descriptors owned by entities
pub trait FdRegistry: Send {
    /// Registering an fd twice is an error
    fn register(&mut self, fd: RawFd, token: FdToken, interest: Interest) -> io::Result<()>;
    fn set_interest(&mut self, fd: RawFd, interest: Interest) -> io::Result<()>;
    /// Returns false if the fd was not registered
    fn unregister(&mut self, fd: RawFd) -> bool;
    fn is_registered(&self, fd: RawFd) -> bool;
    /// Waits up to `timeout` and returns the ready descriptors
    fn wait(&mut self, timeout: Duration) -> io::Result<Vec<Readiness>>;
}

struct Registration {
    token: FdToken,
    interest: Interest,
}

/// poll(2) based registry
#[derive(Default)]
pub struct PollSet {
    fds: HashMap<RawFd, Registration>,
}

impl PollSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FdRegistry for PollSet {
    fn register(&mut self, fd: RawFd, token: FdToken, interest: Interest) -> io::Result<()> {
        if fd < 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "negative fd"));
        }
        if self.fds.contains_key(&fd) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, format!("fd {} already registered", fd)));
        }
        self.fds.insert(fd, Registration { token, interest });
        Ok(())
    }

    fn set_interest(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        match self.fds.get_mut(&fd) {
            Some(reg) => {
                reg.interest = interest;
                Ok(())
            }
            None => Err(io::Error::new(io::ErrorKind::NotFound, format!("fd {} not registered", fd))),
        }
    }

    fn unregister(&mut self, fd: RawFd) -> bool {
        self.fds.remove(&fd).is_some()
    }

    fn is_registered(&self, fd: RawFd) -> bool {
        self.fds.contains_key(&fd)
    }

    fn wait(&mut self, timeout: Duration) -> io::Result<Vec<Readiness>> {
        let mut pollfds: Vec<libc::pollfd> = Vec::with_capacity(self.fds.len());
        let mut tokens: Vec<FdToken> = Vec::with_capacity(self.fds.len());
        for (fd, reg) in &self.fds {
            let mut events: libc::c_short = 0;
            if reg.interest.read {
                events |= libc::POLLIN;
            }
            if reg.interest.write {
                events |= libc::POLLOUT;
            }
            if events == 0 {
                continue;
            }
            pollfds.push(libc::pollfd { fd: *fd, events, revents: 0 });
            tokens.push(reg.token);
        }

        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;
        if pollfds.is_empty() {
            // Nothing to watch, still honour the timeout so the loop does not spin
            std::thread::sleep(timeout);
            return Ok(Vec::new());
        }

        let rc = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        let mut ready = Vec::with_capacity(rc as usize);
        for (pfd, token) in pollfds.iter().zip(tokens) {
            if pfd.revents == 0 {
                continue;
            }
            ready.push(Readiness {
                token,
                readable: pfd.revents & libc::POLLIN != 0,
                writable: pfd.revents & libc::POLLOUT != 0,
                hangup: pfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0,
            });
        }
        Ok(ready)
    }
}
