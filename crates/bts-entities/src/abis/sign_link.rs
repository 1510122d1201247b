use bts_core::bts_entities::BtsEntity;
use bts_core::{BtsNr, Sap, TrxNr};
use bts_saps::abis::{AbisOmlDataInd, AbisRslDataInd, SignLinkKind};
use bts_saps::{SapMsg, SapMsgInner};
use crossbeam_channel::Sender;
use thiserror::Error;

use super::ipa_worker::AbisCommand;
use crate::BtsCtx;
use crate::bts::gsm_data::Bts;
use crate::bts::lifecycle::{bts_link_estab, trx_link_estab};

/// TEI of the OML link
pub const OML_TEI: u8 = 255;
/// TEI of every RSL link
pub const RSL_TEI: u8 = 0;

/// A logical signalling link on the Abis line. Owned by the Bts (OML) or Trx (RSL)
/// it belongs to; the link itself holds no reference back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignLink {
    pub kind: SignLinkKind,
    /// Line timeslot: 1 for OML, 2 + n for the RSL of TRX n
    pub ts_nr: u8,
    pub tei: u8,
    pub sapi: u8,
}

impl SignLink {
    pub fn oml() -> Self {
        Self {
            kind: SignLinkKind::Oml,
            ts_nr: 1,
            tei: OML_TEI,
            sapi: 0,
        }
    }

    pub fn rsl(trx_nr: TrxNr) -> Self {
        Self {
            kind: SignLinkKind::Rsl { trx_nr },
            ts_nr: 2 + trx_nr,
            tei: RSL_TEI,
            sapi: 0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbisError {
    #[error("BTS {0} does not exist")]
    UnknownBts(BtsNr),
    #[error("TRX #{0} does not exist")]
    UnknownTrx(TrxNr),
    #[error("no {0:?} link established")]
    NoLink(SignLinkKind),
    #[error("Abis transport is gone")]
    TransportGone,
}

/// Creates the logical link for `kind` and runs the matching link establishment.
/// Returns None, leaving everything as it was, for an unknown TRX or a link that is already up.
pub fn sign_link_up(ctx: &mut BtsCtx, bts_nr: BtsNr, kind: SignLinkKind) -> Option<SignLink> {
    let Some(bts) = ctx.registry.get_mut(bts_nr) else {
        tracing::error!("{}", AbisError::UnknownBts(bts_nr));
        return None;
    };

    match kind {
        SignLinkKind::Oml => {
            if bts.oml_link.is_some() {
                tracing::warn!("OML Signalling link already up, ignoring");
                return None;
            }
            tracing::info!(gt = %ctx.gt, "OML Signalling link up");
            let link = SignLink::oml();
            bts.oml_link = Some(link);
            bts_link_estab(ctx, bts_nr);
            Some(link)
        }
        SignLinkKind::Rsl { trx_nr } => {
            let Some(trx) = bts.get_trx_mut(trx_nr) else {
                tracing::error!("{}", AbisError::UnknownTrx(trx_nr));
                return None;
            };
            if trx.rsl_link.is_some() {
                tracing::warn!("RSL Signalling link for TRX {} already up, ignoring", trx_nr);
                return None;
            }
            tracing::info!(gt = %ctx.gt, "RSL Signalling link for TRX {} up", trx_nr);
            let link = SignLink::rsl(trx_nr);
            trx.rsl_link = Some(link);
            trx_link_estab(ctx, bts_nr, trx_nr);
            Some(link)
        }
    }
}

/// Tears down every link of the line and tells the model the transport is gone.
/// Links that are already down are skipped, so calling this again is harmless.
pub fn sign_link_down(ctx: &mut BtsCtx, bts_nr: BtsNr) {
    tracing::error!(gt = %ctx.gt, "Signalling link down");

    let Some(bts) = ctx.registry.get_mut(bts_nr) else {
        return;
    };
    // Clear the references before anyone gets to act on the change
    let rsl_down: Vec<TrxNr> = bts
        .trx
        .iter_mut()
        .filter_map(|trx| trx.rsl_link.take().map(|_| trx.nr))
        .collect();
    let oml_down = bts.oml_link.take().is_some();

    for trx_nr in rsl_down {
        trx_link_estab(ctx, bts_nr, trx_nr);
    }
    if oml_down {
        tracing::debug!("OML Signalling link destroyed");
    }

    if let Some(bts) = ctx.registry.get(bts_nr) {
        ctx.model.abis_close(ctx.queue, bts);
    }
}

/// Hands a received frame to the OML or RSL handler, depending on the link it came in on.
/// Frames for links that are not up are refused.
pub fn sign_link_dispatch(ctx: &mut BtsCtx, bts_nr: BtsNr, kind: SignLinkKind, data: Vec<u8>) -> Result<(), AbisError> {
    let bts = ctx.registry.get(bts_nr).ok_or(AbisError::UnknownBts(bts_nr))?;

    let (sap, dest, msg) = match kind {
        SignLinkKind::Oml => {
            bts.oml_link.ok_or(AbisError::NoLink(kind))?;
            (Sap::OmlSap, BtsEntity::Oml, SapMsgInner::AbisOmlDataInd(AbisOmlDataInd { data }))
        }
        SignLinkKind::Rsl { trx_nr } => {
            let trx = bts.get_trx(trx_nr).ok_or(AbisError::UnknownTrx(trx_nr))?;
            trx.rsl_link.ok_or(AbisError::NoLink(kind))?;
            (Sap::RslSap, BtsEntity::Rsl, SapMsgInner::AbisRslDataInd(AbisRslDataInd { trx_nr, data }))
        }
    };
    ctx.queue.push_back(SapMsg::new(sap, BtsEntity::Abis, dest, ctx.gt, msg));
    Ok(())
}

/// Sends an OML message on the OML link of `bts`
pub fn abis_oml_sendmsg(bts: &Bts, tx: &Sender<AbisCommand>, data: Vec<u8>) -> Result<(), AbisError> {
    let link = bts.oml_link.ok_or(AbisError::NoLink(SignLinkKind::Oml))?;
    tx.send(AbisCommand::Send { kind: link.kind, data })
        .map_err(|_| AbisError::TransportGone)
}

/// Sends an RSL message on the RSL link of one TRX
pub fn abis_rsl_sendmsg(bts: &Bts, trx_nr: TrxNr, tx: &Sender<AbisCommand>, data: Vec<u8>) -> Result<(), AbisError> {
    let trx = bts.get_trx(trx_nr).ok_or(AbisError::UnknownTrx(trx_nr))?;
    let link = trx.rsl_link.ok_or(AbisError::NoLink(SignLinkKind::Rsl { trx_nr }))?;
    tx.send(AbisCommand::Send { kind: link.kind, data })
        .map_err(|_| AbisError::TransportGone)
}
