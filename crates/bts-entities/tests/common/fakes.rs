//! Stand-ins for the hardware model, the poll set and the DSP queue devices

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::os::unix::io::RawFd;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bts_core::{BtsNr, TrxNr};
use bts_entities::MessageQueue;
use bts_entities::bts::{Bts, Trx};
use bts_entities::fdset::{FdRegistry, FdToken, Interest, Readiness};
use bts_entities::l1::{DeviceOpener, L1Device};
use bts_entities::model::{BtsInitError, BtsModel};

/// Model hook invocations, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelCall {
    Init(BtsNr),
    OmlEstab(BtsNr),
    AbisClose(BtsNr),
    TrxDeactRf(TrxNr),
    TrxClose(TrxNr),
}

/// Records every hook call; queues nothing
pub struct FakeModel {
    pub calls: Arc<Mutex<Vec<ModelCall>>>,
    pub fail_init: bool,
}

impl FakeModel {
    pub fn new(calls: Arc<Mutex<Vec<ModelCall>>>) -> Self {
        Self { calls, fail_init: false }
    }

    fn record(&self, call: ModelCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl BtsModel for FakeModel {
    fn name(&self) -> &str {
        "fake"
    }

    fn init(&mut self, bts: &mut Bts) -> Result<(), BtsInitError> {
        self.record(ModelCall::Init(bts.nr));
        if self.fail_init {
            return Err(BtsInitError::Model {
                model: "fake".to_string(),
                reason: "refused".to_string(),
            });
        }
        Ok(())
    }

    fn oml_estab(&mut self, _queue: &mut MessageQueue, bts: &Bts) {
        self.record(ModelCall::OmlEstab(bts.nr));
    }

    fn abis_close(&mut self, _queue: &mut MessageQueue, bts: &Bts) {
        self.record(ModelCall::AbisClose(bts.nr));
    }

    fn trx_deact_rf(&mut self, _queue: &mut MessageQueue, trx: &Trx) {
        self.record(ModelCall::TrxDeactRf(trx.nr));
    }

    fn trx_close(&mut self, _queue: &mut MessageQueue, trx: &Trx) {
        self.record(ModelCall::TrxClose(trx.nr));
    }
}

#[derive(Default)]
pub struct FdState {
    pub registered: HashMap<RawFd, (FdToken, Interest)>,
    /// Handed out by the next wait()
    pub ready: VecDeque<Readiness>,
}

/// Poll set whose readiness is scripted by the test
#[derive(Clone, Default)]
pub struct FakeFds {
    pub state: Arc<Mutex<FdState>>,
}

impl FakeFds {
    pub fn push_ready(&self, readiness: Readiness) {
        self.state.lock().unwrap().ready.push_back(readiness);
    }

    pub fn num_registered(&self) -> usize {
        self.state.lock().unwrap().registered.len()
    }

    pub fn interest_of(&self, token: FdToken) -> Option<Interest> {
        let state = self.state.lock().unwrap();
        state
            .registered
            .values()
            .find(|(t, _)| *t == token)
            .map(|(_, interest)| *interest)
    }
}

impl FdRegistry for FakeFds {
    fn register(&mut self, fd: RawFd, token: FdToken, interest: Interest) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.registered.contains_key(&fd) {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "fd already registered"));
        }
        state.registered.insert(fd, (token, interest));
        Ok(())
    }

    fn set_interest(&mut self, fd: RawFd, interest: Interest) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.registered.get_mut(&fd) {
            Some(entry) => {
                entry.1 = interest;
                Ok(())
            }
            None => Err(io::Error::new(io::ErrorKind::NotFound, "fd not registered")),
        }
    }

    fn unregister(&mut self, fd: RawFd) -> bool {
        self.state.lock().unwrap().registered.remove(&fd).is_some()
    }

    fn is_registered(&self, fd: RawFd) -> bool {
        self.state.lock().unwrap().registered.contains_key(&fd)
    }

    fn wait(&mut self, _timeout: Duration) -> io::Result<Vec<Readiness>> {
        Ok(self.state.lock().unwrap().ready.drain(..).collect())
    }
}

#[derive(Default)]
pub struct DspState {
    /// Scripted read results per device path; an empty script reads as WouldBlock
    pub reads: HashMap<PathBuf, VecDeque<io::Result<Vec<u8>>>>,
    pub written: HashMap<PathBuf, Vec<Vec<u8>>>,
    /// Paths that fail to open
    pub fail_open: HashSet<PathBuf>,
    /// Writes accept only this many bytes
    pub short_write: Option<usize>,
    pub next_fd: RawFd,
}

/// The DSP side of the message queues, shared between the test and the opened devices
#[derive(Clone, Default)]
pub struct FakeDsp {
    pub state: Arc<Mutex<DspState>>,
}

impl FakeDsp {
    pub fn push_read(&self, path: &Path, data: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.reads.entry(path.to_path_buf()).or_default().push_back(Ok(data));
    }

    pub fn push_read_err(&self, path: &Path, kind: io::ErrorKind) {
        let mut state = self.state.lock().unwrap();
        state.reads.entry(path.to_path_buf()).or_default().push_back(Err(kind.into()));
    }

    pub fn remaining_reads(&self, path: &Path) -> usize {
        self.state.lock().unwrap().reads.get(path).map_or(0, |r| r.len())
    }

    pub fn written(&self, path: &Path) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().written.get(path).cloned().unwrap_or_default()
    }

    pub fn fail_open(&self, path: &Path) {
        self.state.lock().unwrap().fail_open.insert(path.to_path_buf());
    }

    pub fn set_short_write(&self, accept: Option<usize>) {
        self.state.lock().unwrap().short_write = accept;
    }

    pub fn opener(&self) -> FakeOpener {
        FakeOpener { dsp: self.clone() }
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn L1Device>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_open.contains(path) {
            return Err(io::ErrorKind::NotFound.into());
        }
        state.next_fd += 1;
        Ok(Box::new(FakeDev {
            fd: 100 + state.next_fd,
            path: path.to_path_buf(),
            dsp: self.clone(),
        }))
    }
}

pub struct FakeOpener {
    dsp: FakeDsp,
}

impl DeviceOpener for FakeOpener {
    fn open_read(&mut self, path: &Path) -> io::Result<Box<dyn L1Device>> {
        self.dsp.open(path)
    }

    fn open_write(&mut self, path: &Path) -> io::Result<Box<dyn L1Device>> {
        self.dsp.open(path)
    }
}

pub struct FakeDev {
    fd: RawFd,
    path: PathBuf,
    dsp: FakeDsp,
}

impl L1Device for FakeDev {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.dsp.state.lock().unwrap();
        match state.reads.get_mut(&self.path).and_then(|r| r.pop_front()) {
            None => Err(io::ErrorKind::WouldBlock.into()),
            Some(Ok(data)) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            Some(Err(e)) => Err(e),
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.dsp.state.lock().unwrap();
        let len = state.short_write.map_or(buf.len(), |accept| accept.min(buf.len()));
        state.written.entry(self.path.clone()).or_default().push(buf[..len].to_vec());
        Ok(len)
    }

    fn raw_fd(&self) -> RawFd {
        self.fd
    }
}
