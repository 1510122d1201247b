use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

/// One direction of a DSP message queue
pub trait L1Device: Send {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
    fn raw_fd(&self) -> RawFd;
}

/// Opens queue devices, so tests can run without the DSP
pub trait DeviceOpener: Send {
    fn open_read(&mut self, path: &Path) -> io::Result<Box<dyn L1Device>>;
    fn open_write(&mut self, path: &Path) -> io::Result<Box<dyn L1Device>>;
}

/// Character device under /dev/msgq. Each read or write moves one whole primitive.
pub struct MsgqDevice {
    file: File,
}

impl L1Device for MsgqDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

#[derive(Default)]
pub struct MsgqOpener;

impl DeviceOpener for MsgqOpener {
    fn open_read(&mut self, path: &Path) -> io::Result<Box<dyn L1Device>> {
        let file = OpenOptions::new().read(true).custom_flags(libc::O_NONBLOCK).open(path)?;
        Ok(Box::new(MsgqDevice { file }))
    }

    fn open_write(&mut self, path: &Path) -> io::Result<Box<dyn L1Device>> {
        let file = OpenOptions::new().write(true).custom_flags(libc::O_NONBLOCK).open(path)?;
        Ok(Box::new(MsgqDevice { file }))
    }
}
