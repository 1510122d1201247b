//! Envelope-level handlers for the collaborators above and beside the core:
//! OML and RSL message processing and the L1 primitive dispatcher.
//! They account for what they receive; message contents are not interpreted.

use bts_config::SharedConfig;
use bts_core::bts_entities::BtsEntity;
use bts_core::unimplemented_log;
use bts_saps::control::BtsControl;
use bts_saps::{SapMsg, SapMsgInner};

use crate::{BtsCtx, BtsEntityTrait};

pub struct OmlHandler {
    /// State change reports waiting to be encoded
    pub state_reports: u32,
    pub rx_msgs: u32,
}

impl OmlHandler {
    pub fn new(_config: SharedConfig) -> Self {
        Self { state_reports: 0, rx_msgs: 0 }
    }
}

impl BtsEntityTrait for OmlHandler {
    fn entity(&self) -> BtsEntity {
        BtsEntity::Oml
    }

    fn rx_prim(&mut self, _ctx: &mut BtsCtx, message: SapMsg) {
        match message.msg {
            SapMsgInner::NmStateChangedInd(ind) => {
                self.state_reports += 1;
                tracing::debug!("OML: State Changed Event Report {} {}", ind.mo, ind.state);
            }
            SapMsgInner::AbisOmlDataInd(ind) => {
                self.rx_msgs += 1;
                unimplemented_log!("OML message ({} bytes)", ind.data.len());
            }
            _ => panic!("unexpected message {}", message.msg),
        }
    }
}

pub struct RslHandler {
    pub rx_msgs: u32,
    pub rf_res_reports: u32,
    pub load_inds: u32,
}

impl RslHandler {
    pub fn new(_config: SharedConfig) -> Self {
        Self {
            rx_msgs: 0,
            rf_res_reports: 0,
            load_inds: 0,
        }
    }
}

impl BtsEntityTrait for RslHandler {
    fn entity(&self) -> BtsEntity {
        BtsEntity::Rsl
    }

    fn rx_prim(&mut self, _ctx: &mut BtsCtx, message: SapMsg) {
        match message.msg {
            SapMsgInner::RslRfResourceReq(req) => {
                self.rf_res_reports += 1;
                tracing::info!("RSL: RF Resource Indication for TRX {}", req.trx_nr);
            }
            SapMsgInner::BtsControl(BtsControl::CcchLoadInd {
                bts_nr,
                pch_msgs,
                agch_msgs,
                agch_queue_len,
            }) => {
                self.load_inds += 1;
                tracing::debug!(
                    "RSL: CCCH Load Indication bts {} pch {} agch {} queue {}",
                    bts_nr,
                    pch_msgs,
                    agch_msgs,
                    agch_queue_len
                );
            }
            SapMsgInner::AbisRslDataInd(ind) => {
                self.rx_msgs += 1;
                unimplemented_log!("RSL message for TRX {} ({} bytes)", ind.trx_nr, ind.data.len());
            }
            _ => panic!("unexpected message {}", message.msg),
        }
    }
}

/// Counts primitives per DSP queue
pub struct L1SapHandler {
    pub rx_prims: [u32; 4],
}

impl L1SapHandler {
    pub fn new(_config: SharedConfig) -> Self {
        Self { rx_prims: [0; 4] }
    }
}

impl BtsEntityTrait for L1SapHandler {
    fn entity(&self) -> BtsEntity {
        BtsEntity::L1Sap
    }

    fn rx_prim(&mut self, _ctx: &mut BtsCtx, message: SapMsg) {
        match message.msg {
            SapMsgInner::L1PrimInd(prim) => {
                self.rx_prims[prim.queue.index()] += 1;
                tracing::trace!("L1SAP: {:?} primitive on {}", prim.kind, prim.queue);
            }
            _ => panic!("unexpected message {}", message.msg),
        }
    }
}
