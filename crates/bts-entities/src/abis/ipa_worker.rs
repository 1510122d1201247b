//! Abis/IP worker thread: keeps the TCP connection to the BSC, answers the
//! IPA connection management protocol and passes signalling frames to the Abis entity.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bts_core::TrxNr;
use bts_saps::abis::SignLinkKind;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::ipa::{CcmMsgType, FrameDecoder, IpaFrame, IpaStream, IpaUnit, encode_frame};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_millis(10);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Events the worker sends to the Abis entity
#[derive(Debug)]
pub enum AbisEvent {
    /// A logical link became usable
    LinkUp { kind: SignLinkKind },
    /// The transport connection is gone, with all links on it
    LinkDown,
    /// A signalling frame arrived on a link
    Frame { kind: SignLinkKind, data: Vec<u8> },
}

/// Commands the Abis entity sends to the worker
#[derive(Debug)]
pub enum AbisCommand {
    Send { kind: SignLinkKind, data: Vec<u8> },
    /// Close the connection and stop the worker
    Close,
}

#[derive(Debug, Clone)]
pub struct AbisWorkerConfig {
    pub remote_host: String,
    pub remote_port: u16,
    pub num_trx: u8,
    pub unit: IpaUnit,
}

enum LoopExit {
    /// Close was requested
    Closed,
    /// The connection failed; reconnect
    Failed(String),
}

pub struct AbisWorker {
    config: AbisWorkerConfig,
    event_sender: Sender<AbisEvent>,
    command_receiver: Receiver<AbisCommand>,
    /// Links announced as up on the current connection
    links_up: HashSet<SignLinkKind>,
}

impl AbisWorker {
    pub fn new(config: AbisWorkerConfig, event_sender: Sender<AbisEvent>, command_receiver: Receiver<AbisCommand>) -> Self {
        Self {
            config,
            event_sender,
            command_receiver,
            links_up: HashSet::new(),
        }
    }

    /// Main worker entry point, runs until Close is received or the entity is gone
    pub fn run(&mut self) {
        tracing::info!("AbisWorker starting, BSC {}:{}", self.config.remote_host, self.config.remote_port);

        loop {
            match self.connect_and_run() {
                LoopExit::Closed => break,
                LoopExit::Failed(e) => {
                    tracing::error!("AbisWorker: connection error: {}", e);
                    if !self.links_up.is_empty() {
                        self.links_up.clear();
                        if self.event_sender.send(AbisEvent::LinkDown).is_err() {
                            break;
                        }
                    }
                    tracing::info!("AbisWorker: reconnecting in {:?}", RECONNECT_DELAY);
                    match self.command_receiver.recv_timeout(RECONNECT_DELAY) {
                        Ok(AbisCommand::Close) | Err(RecvTimeoutError::Disconnected) => break,
                        Ok(AbisCommand::Send { kind, .. }) => {
                            tracing::warn!("AbisWorker: not connected, dropping {:?} message", kind);
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                }
            }
        }

        tracing::info!("AbisWorker stopped");
    }

    fn connect(&self) -> Result<TcpStream, String> {
        let addr = (self.config.remote_host.as_str(), self.config.remote_port)
            .to_socket_addrs()
            .map_err(|e| format!("cannot resolve {}: {}", self.config.remote_host, e))?
            .next()
            .ok_or_else(|| format!("no address for {}", self.config.remote_host))?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(|e| format!("TCP connect failed: {}", e))?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| format!("failed to set timeout: {}", e))?;
        let _ = stream.set_nodelay(true);
        Ok(stream)
    }

    fn connect_and_run(&mut self) -> LoopExit {
        let mut stream = match self.connect() {
            Ok(stream) => stream,
            Err(e) => return LoopExit::Failed(e),
        };
        tracing::info!("AbisWorker: connected to {}:{}", self.config.remote_host, self.config.remote_port);
        self.message_loop(&mut stream)
    }

    fn message_loop(&mut self, stream: &mut TcpStream) -> LoopExit {
        let mut decoder = FrameDecoder::new();
        let mut buf = [0u8; 4096];

        loop {
            // Outbound first, so replies are not held back by a busy socket
            loop {
                match self.command_receiver.try_recv() {
                    Ok(AbisCommand::Send { kind, data }) => {
                        if !self.links_up.contains(&kind) {
                            tracing::warn!("AbisWorker: {:?} link not up, dropping message", kind);
                            continue;
                        }
                        if let Err(e) = send_frame(stream, IpaStream::from(kind), &data) {
                            return LoopExit::Failed(e);
                        }
                    }
                    Ok(AbisCommand::Close) => {
                        let _ = stream.shutdown(std::net::Shutdown::Both);
                        return LoopExit::Closed;
                    }
                    Err(crossbeam_channel::TryRecvError::Empty) => break,
                    Err(crossbeam_channel::TryRecvError::Disconnected) => return LoopExit::Closed,
                }
            }

            match stream.read(&mut buf) {
                Ok(0) => return LoopExit::Failed("connection closed by BSC".to_string()),
                Ok(n) => decoder.push(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => return LoopExit::Failed(format!("read failed: {}", e)),
            }

            while let Some(frame) = decoder.next_frame() {
                if let Err(e) = self.handle_frame(stream, frame) {
                    return LoopExit::Failed(e);
                }
            }
        }
    }

    fn handle_frame(&mut self, stream: &mut TcpStream, frame: IpaFrame) -> Result<(), String> {
        match frame.stream {
            IpaStream::Ccm => self.handle_ccm(stream, &frame.payload),
            IpaStream::Oml => {
                self.forward(SignLinkKind::Oml, frame.payload);
                Ok(())
            }
            IpaStream::Rsl(trx_nr) => {
                let kind = SignLinkKind::Rsl { trx_nr };
                // The BSC addresses a TRX only after configuring it over OML
                if self.links_up.contains(&SignLinkKind::Oml) && !self.links_up.contains(&kind) {
                    self.link_up(kind);
                }
                self.forward(kind, frame.payload);
                Ok(())
            }
            IpaStream::Other(raw) => {
                tracing::debug!("AbisWorker: discarding frame on stream 0x{:02x}", raw);
                Ok(())
            }
        }
    }

    fn handle_ccm(&mut self, stream: &mut TcpStream, payload: &[u8]) -> Result<(), String> {
        let Some(&msg_type) = payload.first() else {
            return Ok(());
        };
        match CcmMsgType::try_from(msg_type) {
            Ok(CcmMsgType::Ping) => send_frame(stream, IpaStream::Ccm, &[CcmMsgType::Pong as u8]),
            Ok(CcmMsgType::Pong) => Ok(()),
            Ok(CcmMsgType::IdGet) => {
                tracing::debug!("AbisWorker: ID_GET");
                let resp = self.config.unit.build_id_resp(payload, 0);
                send_frame(stream, IpaStream::Ccm, &resp)
            }
            Ok(CcmMsgType::IdAck) => {
                tracing::debug!("AbisWorker: ID_ACK");
                send_frame(stream, IpaStream::Ccm, &[CcmMsgType::IdAck as u8])?;
                if !self.links_up.contains(&SignLinkKind::Oml) {
                    self.link_up(SignLinkKind::Oml);
                }
                Ok(())
            }
            Ok(CcmMsgType::IdResp) | Err(_) => {
                tracing::debug!("AbisWorker: ignoring CCM message 0x{:02x}", msg_type);
                Ok(())
            }
        }
    }

    fn link_up(&mut self, kind: SignLinkKind) {
        if let SignLinkKind::Rsl { trx_nr } = kind {
            if !self.trx_configured(trx_nr) {
                tracing::warn!("AbisWorker: RSL for unconfigured TRX {}", trx_nr);
            }
        }
        self.links_up.insert(kind);
        let _ = self.event_sender.send(AbisEvent::LinkUp { kind });
    }

    fn trx_configured(&self, trx_nr: TrxNr) -> bool {
        trx_nr < self.config.num_trx
    }

    fn forward(&self, kind: SignLinkKind, data: Vec<u8>) {
        if !self.links_up.contains(&kind) {
            tracing::debug!("AbisWorker: {:?} frame before link up, discarding", kind);
            return;
        }
        let _ = self.event_sender.send(AbisEvent::Frame { kind, data });
    }
}

fn send_frame(stream: &mut TcpStream, ipa_stream: IpaStream, payload: &[u8]) -> Result<(), String> {
    let frame = encode_frame(ipa_stream, payload).map_err(|e| format!("cannot encode frame: {}", e))?;
    stream.write_all(&frame).map_err(|e| format!("write failed: {}", e))
}
