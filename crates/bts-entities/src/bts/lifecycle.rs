use std::time::Duration;

use bts_config::StackConfig;
use bts_core::bts_entities::BtsEntity;
use bts_core::{AvailState, BtsNr, GsmTime, NmState, OpState, Sap, TrxNr};
use bts_saps::abis::RslRfResourceReq;
use bts_saps::nm::NmStateChangedInd;
use bts_saps::{SapMsg, SapMsgInner};

use super::gsm_data::{Bts, ManagedObject};
use crate::model::{BtsInitError, BtsModel};
use crate::timers::TimerId;
use crate::{BtsCtx, MessageQueue};

/// Creates a BTS from configuration and adds it to the registry.
/// If the model cannot initialise it, the BTS is taken out again.
pub fn bts_init(ctx: &mut BtsCtx, cfg: &StackConfig) -> Result<BtsNr, BtsInitError> {
    let bts_nr = cfg.bts.bts_nr;
    let mut bts = Bts::new(&cfg.bts);
    bts.shutdown_delay_secs = cfg.shutdown.delay_secs;
    if ctx.registry.add(bts).is_err() {
        return Err(BtsInitError::AlreadyRegistered(bts_nr));
    }

    let Some(bts) = ctx.registry.get_mut(bts_nr) else {
        return Err(BtsInitError::AlreadyRegistered(bts_nr));
    };
    if let Err(e) = ctx.model.init(bts) {
        tracing::error!("BTS {}: {}", bts_nr, e);
        ctx.registry.remove(bts_nr);
        return Err(e);
    }

    let period = bts.role.load_ind_period;
    tracing::info!(
        "BTS {} initialised: model {}, band {}, {} TRX",
        bts_nr,
        ctx.model.name(),
        bts.band,
        bts.trx.len()
    );
    ctx.timers.schedule(TimerId::LoadInd(bts_nr), Duration::from_secs(period as u64));
    Ok(bts_nr)
}

/// Deactivates and closes every TRX, then arms the delayed exit.
/// A shutdown that is already pending is left alone.
pub fn bts_shutdown(ctx: &mut BtsCtx, bts_nr: BtsNr, reason: &str) {
    if ctx.timers.is_pending(TimerId::Shutdown) {
        tracing::info!("BTS is already being shutdown.");
        return;
    }
    let Some(bts) = ctx.registry.get(bts_nr) else {
        tracing::warn!("shutdown of unknown BTS {}", bts_nr);
        return;
    };

    close_all_trx(ctx.queue, ctx.model, bts, reason);
    ctx.timers.schedule(TimerId::Shutdown, Duration::from_secs(bts.shutdown_delay_secs));
}

/// Shuts down every registered BTS under a single exit timer, which runs
/// with the longest configured delay.
pub fn bts_shutdown_all(ctx: &mut BtsCtx, reason: &str) {
    if ctx.timers.is_pending(TimerId::Shutdown) {
        tracing::info!("BTS is already being shutdown.");
        return;
    }

    let mut delay_secs = 0;
    for bts in ctx.registry.iter() {
        close_all_trx(ctx.queue, ctx.model, bts, reason);
        delay_secs = delay_secs.max(bts.shutdown_delay_secs);
    }
    ctx.timers.schedule(TimerId::Shutdown, Duration::from_secs(delay_secs));
}

fn close_all_trx(queue: &mut MessageQueue, model: &mut dyn BtsModel, bts: &Bts, reason: &str) {
    tracing::info!("Shutting down BTS {}, Reason {}", bts.nr, reason);
    for trx in &bts.trx {
        model.trx_deact_rf(queue, trx);
        model.trx_close(queue, trx);
    }
}

/// OML is up: every managed object of the BTS announces its state, then the model takes over
pub fn bts_link_estab(ctx: &mut BtsCtx, bts_nr: BtsNr) {
    let Some(bts) = ctx.registry.get(bts_nr) else {
        return;
    };
    tracing::info!("Main link established, sending Status'.");

    for mo in bts.managed_objects() {
        tx_state_changed(ctx.queue, ctx.gt, mo);
    }
    ctx.model.oml_estab(ctx.queue, bts);
}

/// The RSL link of a TRX came or went; its operational state follows the link
pub fn trx_link_estab(ctx: &mut BtsCtx, bts_nr: BtsNr, trx_nr: TrxNr) {
    let Some(trx) = ctx.registry.get_mut(bts_nr).and_then(|bts| bts.get_trx_mut(trx_nr)) else {
        return;
    };
    let link_up = trx.rsl_link.is_some();
    tracing::info!("RSL link (TRX {:02x}) state changed to {}, sending Status'.", trx_nr, if link_up { "up" } else { "down" });

    let op = if link_up { OpState::Enabled } else { OpState::Disabled };
    mo_state_chg(ctx.queue, ctx.gt, &mut trx.mo, op, AvailState::Ok);

    if link_up {
        ctx.queue.push_back(SapMsg::new(
            Sap::RslSap,
            BtsEntity::Bts,
            BtsEntity::Rsl,
            ctx.gt,
            SapMsgInner::RslRfResourceReq(RslRfResourceReq { trx_nr }),
        ));
    }
}

/// Reports the current state of a managed object to the OML handler
pub fn tx_state_changed(queue: &mut MessageQueue, gt: GsmTime, mo: &ManagedObject) {
    tracing::debug!("{}: {}", mo.id, mo.state);
    queue.push_back(SapMsg::new(
        Sap::NmSap,
        BtsEntity::Bts,
        BtsEntity::Oml,
        gt,
        SapMsgInner::NmStateChangedInd(NmStateChangedInd { mo: mo.id, state: mo.state }),
    ));
}

/// Changes the state of a managed object and reports it, if it actually changed
pub fn mo_state_chg(queue: &mut MessageQueue, gt: GsmTime, mo: &mut ManagedObject, op: OpState, avail: AvailState) -> bool {
    let new_state = NmState::new(op, avail);
    if mo.state == new_state {
        return false;
    }
    mo.state = new_state;
    tx_state_changed(queue, gt, mo);
    true
}
