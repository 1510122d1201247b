use std::io;
use std::thread;

use bts_config::SharedConfig;
use bts_core::BtsNr;
use bts_core::bts_entities::BtsEntity;
use bts_saps::abis::SignLinkKind;
use bts_saps::{SapMsg, SapMsgInner};
use crossbeam_channel::{Receiver, Sender, unbounded};

use super::ipa::{IpaUnit, read_mac_addr};
use super::ipa_worker::{AbisCommand, AbisEvent, AbisWorker, AbisWorkerConfig};
use super::sign_link::{AbisError, abis_oml_sendmsg, abis_rsl_sendmsg, sign_link_dispatch, sign_link_down, sign_link_up};
use crate::{BtsCtx, BtsEntityTrait};

/// Abis/IP client in the BTS role. The transport runs on a worker thread;
/// link events are picked up once per loop iteration.
pub struct AbisBs {
    config: SharedConfig,
    bts_nr: BtsNr,
    event_receiver: Receiver<AbisEvent>,
    command_sender: Sender<AbisCommand>,
    worker_handle: Option<thread::JoinHandle<()>>,
}

impl AbisBs {
    /// Builds the unit identity from configuration and starts the worker towards `remote_host`
    pub fn open(config: SharedConfig, remote_host: &str) -> io::Result<Self> {
        let cfg = config.config();
        let unit = IpaUnit::from_config(&cfg, read_mac_addr("eth0"));
        tracing::info!(
            "Abis: unit {} site {} bts {}, {} RSL links",
            unit.unit_name,
            unit.site_id,
            unit.bts_id,
            cfg.bts.num_trx
        );
        let worker_config = AbisWorkerConfig {
            remote_host: remote_host.to_string(),
            remote_port: cfg.abis.remote_port,
            num_trx: cfg.bts.num_trx,
            unit,
        };

        let (event_sender, event_receiver) = unbounded::<AbisEvent>();
        let (command_sender, command_receiver) = unbounded::<AbisCommand>();
        let handle = thread::Builder::new().name("abis-worker".to_string()).spawn(move || {
            let mut worker = AbisWorker::new(worker_config, event_sender, command_receiver);
            worker.run();
        })?;

        let mut abis = Self::with_channels(config, event_receiver, command_sender);
        abis.worker_handle = Some(handle);
        Ok(abis)
    }

    /// Uses existing channel ends instead of starting a worker
    pub fn with_channels(config: SharedConfig, event_receiver: Receiver<AbisEvent>, command_sender: Sender<AbisCommand>) -> Self {
        let bts_nr = config.config().bts.bts_nr;
        Self {
            config,
            bts_nr,
            event_receiver,
            command_sender,
            worker_handle: None,
        }
    }

    fn process_events(&mut self, ctx: &mut BtsCtx) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                AbisEvent::LinkUp { kind } => {
                    if sign_link_up(ctx, self.bts_nr, kind).is_some() && kind == SignLinkKind::Oml {
                        self.config.state_write().abis_connected = true;
                    }
                }
                AbisEvent::LinkDown => {
                    self.config.state_write().abis_connected = false;
                    sign_link_down(ctx, self.bts_nr);
                }
                AbisEvent::Frame { kind, data } => {
                    if let Err(e) = sign_link_dispatch(ctx, self.bts_nr, kind, data) {
                        tracing::warn!(gt = %ctx.gt, "discarding {:?} frame: {}", kind, e);
                    }
                }
            }
        }
    }

    fn send(&mut self, ctx: &mut BtsCtx, kind: SignLinkKind, data: Vec<u8>) {
        let Some(bts) = ctx.registry.get(self.bts_nr) else {
            tracing::warn!("{}", AbisError::UnknownBts(self.bts_nr));
            return;
        };
        let result = match kind {
            SignLinkKind::Oml => abis_oml_sendmsg(bts, &self.command_sender, data),
            SignLinkKind::Rsl { trx_nr } => abis_rsl_sendmsg(bts, trx_nr, &self.command_sender, data),
        };
        if let Err(e) = result {
            tracing::warn!("dropping {:?} message: {}", kind, e);
        }
    }
}

impl BtsEntityTrait for AbisBs {
    fn entity(&self) -> BtsEntity {
        BtsEntity::Abis
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.config = config;
    }

    fn rx_prim(&mut self, ctx: &mut BtsCtx, message: SapMsg) {
        tracing::debug!("rx_prim: {:?} {}", message.sap, message.msg);
        match message.msg {
            SapMsgInner::AbisOmlDataReq(req) => self.send(ctx, SignLinkKind::Oml, req.data),
            SapMsgInner::AbisRslDataReq(req) => self.send(ctx, SignLinkKind::Rsl { trx_nr: req.trx_nr }, req.data),
            _ => panic!("unexpected message {}", message.msg),
        }
    }

    fn poll(&mut self, ctx: &mut BtsCtx) {
        self.process_events(ctx);
    }
}

impl Drop for AbisBs {
    fn drop(&mut self) {
        if self.worker_handle.take().is_some() {
            // The worker notices within one read timeout
            let _ = self.command_sender.send(AbisCommand::Close);
        }
    }
}
