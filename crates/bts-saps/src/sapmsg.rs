use core::fmt::Display;

use bts_core::bts_entities::BtsEntity;
use bts_core::{GsmTime, Sap};

use crate::control::BtsControl;

use super::abis::*;
use super::l1::*;
use super::nm::*;

/// Exhaustive list of messages that travel between entities in a SapMsg
#[derive(Debug)]
pub enum SapMsgInner {
    // L1-SAP
    L1PrimInd(L1PrimInd),
    L1PrimReq(L1PrimReq),

    // L1C-SAP
    L1ControlReq(L1Control),

    // OML
    AbisOmlDataInd(AbisOmlDataInd),
    AbisOmlDataReq(AbisOmlDataReq),

    // RSL
    AbisRslDataInd(AbisRslDataInd),
    AbisRslDataReq(AbisRslDataReq),
    RslRfResourceReq(RslRfResourceReq),

    // NM
    NmStateChangedInd(NmStateChangedInd),

    // Control
    BtsControl(BtsControl),
}

impl Display for SapMsgInner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SapMsgInner::L1PrimInd(p) => write!(f, "L1PrimInd({}, {} bytes)", p.queue, p.data.len()),
            SapMsgInner::L1PrimReq(p) => write!(f, "L1PrimReq({}, {} bytes)", p.queue, p.data.len()),
            SapMsgInner::L1ControlReq(c) => write!(f, "L1ControlReq({:?})", c),
            SapMsgInner::AbisOmlDataInd(_) => write!(f, "AbisOmlDataInd"),
            SapMsgInner::AbisOmlDataReq(_) => write!(f, "AbisOmlDataReq"),
            SapMsgInner::AbisRslDataInd(m) => write!(f, "AbisRslDataInd(trx {})", m.trx_nr),
            SapMsgInner::AbisRslDataReq(m) => write!(f, "AbisRslDataReq(trx {})", m.trx_nr),
            SapMsgInner::RslRfResourceReq(m) => write!(f, "RslRfResourceReq(trx {})", m.trx_nr),
            SapMsgInner::NmStateChangedInd(m) => write!(f, "NmStateChangedInd({} {})", m.mo, m.state),
            SapMsgInner::BtsControl(c) => write!(f, "BtsControl({:?})", c),
        }
    }
}

#[derive(Debug)]
pub struct SapMsg {
    pub sap: Sap,
    pub src: BtsEntity,
    pub dest: BtsEntity,
    /// Last known GSM time at the time the message was created
    pub gt: GsmTime,

    pub msg: SapMsgInner,
}

impl SapMsg {
    pub fn new(sap: Sap, src: BtsEntity, dest: BtsEntity, gt: GsmTime, msg: SapMsgInner) -> Self {
        Self { sap, src, dest, gt, msg }
    }

    pub fn get_source(&self) -> &BtsEntity {
        &self.src
    }
    pub fn get_dest(&self) -> &BtsEntity {
        &self.dest
    }
    pub fn get_sap(&self) -> &Sap {
        &self.sap
    }
}
