use bts_config::{FramingFaultPolicy, SharedConfig};
use bts_core::bts_entities::BtsEntity;
use bts_core::{Sap, TrxNr, log_fatal};
use bts_saps::l1::{L1Control, L1Queue};
use bts_saps::{SapMsg, SapMsgInner};

use super::device::DeviceOpener;
use super::transport::{FdDir, L1Transport, TransportError, decode_token};
use crate::fdset::Readiness;
use crate::{BtsCtx, BtsEntityTrait};

/// Called after a framing fault has been logged, when the policy is to abort
pub type FaultHook = Box<dyn Fn(&TransportError) + Send>;

/// Owner of the DSP message queues. Correctly framed primitives go up to the L1 SAP.
pub struct L1If {
    config: SharedConfig,
    transport: L1Transport,
    fault_hook: FaultHook,
    /// RF state per TRX as last requested
    rf_active: Vec<(TrxNr, bool)>,
    /// Primitives dropped because of framing faults
    pub framing_faults: u32,
}

impl L1If {
    pub fn new(config: SharedConfig, opener: Box<dyn DeviceOpener>) -> Self {
        let transport = L1Transport::new(config.config().l1.clone(), opener);
        Self {
            config,
            transport,
            fault_hook: Box::new(|_| std::process::abort()),
            rf_active: Vec::new(),
            framing_faults: 0,
        }
    }

    /// Replaces the action taken on a framing fault under the abort policy
    pub fn with_fault_hook(mut self, hook: FaultHook) -> Self {
        self.fault_hook = hook;
        self
    }

    pub fn transport(&self) -> &L1Transport {
        &self.transport
    }

    pub fn rf_active(&self, trx_nr: TrxNr) -> bool {
        self.rf_active.iter().any(|(nr, on)| *nr == trx_nr && *on)
    }

    fn rx_control(&mut self, ctx: &mut BtsCtx, ctrl: L1Control) {
        match ctrl {
            L1Control::Open(queue) => {
                if let Err(e) = self.transport.open(queue, ctx.fds) {
                    tracing::error!("{}", e);
                }
            }
            L1Control::Close(queue) => {
                self.transport.close(queue, ctx.fds);
            }
            L1Control::ActivateRf { trx_nr, on } => {
                // The DSP request itself is built by the model specific L1 code
                tracing::info!("RF {} for TRX {}", if on { "activated" } else { "deactivated" }, trx_nr);
                match self.rf_active.iter_mut().find(|(nr, _)| *nr == trx_nr) {
                    Some(entry) => entry.1 = on,
                    None => self.rf_active.push((trx_nr, on)),
                }
            }
        }
    }

    fn read_ready(&mut self, ctx: &mut BtsCtx, queue: L1Queue) {
        let gt = ctx.gt;
        let msg_queue = &mut *ctx.queue;
        let result = self.transport.on_read_ready(queue, &mut |prim| {
            msg_queue.push_back(SapMsg::new(
                Sap::L1Sap,
                BtsEntity::L1If,
                BtsEntity::L1Sap,
                gt,
                SapMsgInner::L1PrimInd(prim),
            ));
        });

        match result {
            Ok(count) => tracing::trace!(gt = %gt, "{} msg_queue: read {} primitives", queue, count),
            Err(e @ TransportError::Framing { .. }) => {
                log_fatal!(gt = gt; "{}", e);
                self.framing_faults += 1;
                if self.config.config().l1.framing_fault == FramingFaultPolicy::Abort {
                    (self.fault_hook)(&e);
                }
            }
            Err(e) => {
                tracing::error!(gt = %gt, "{}", e);
                self.transport.close(queue, ctx.fds);
            }
        }
    }

    fn write_ready(&mut self, ctx: &mut BtsCtx, queue: L1Queue) {
        if let Err(e) = self.transport.on_write_ready(queue, ctx.fds) {
            tracing::error!(gt = %ctx.gt, "{}", e);
            self.transport.close(queue, ctx.fds);
        }
    }
}

impl BtsEntityTrait for L1If {
    fn entity(&self) -> BtsEntity {
        BtsEntity::L1If
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.config = config;
    }

    fn rx_prim(&mut self, ctx: &mut BtsCtx, message: SapMsg) {
        tracing::debug!("rx_prim: {:?} {}", message.sap, message.msg);
        match message.msg {
            SapMsgInner::L1ControlReq(ctrl) => self.rx_control(ctx, ctrl),
            SapMsgInner::L1PrimReq(req) => {
                if let Err(e) = self.transport.enqueue(req.queue, req.data, ctx.fds) {
                    tracing::warn!("dropping primitive: {}", e);
                }
            }
            _ => panic!("unexpected message {}", message.msg),
        }
    }

    fn fd_ready(&mut self, ctx: &mut BtsCtx, id: u32, readiness: Readiness) {
        let Some((queue, dir)) = decode_token(id) else {
            tracing::warn!("fd_ready: unknown token {}", id);
            return;
        };
        match dir {
            FdDir::Read if readiness.readable || readiness.hangup => self.read_ready(ctx, queue),
            FdDir::Write if readiness.writable => self.write_ready(ctx, queue),
            _ => {}
        }
    }
}
