use std::time::Duration;

use bts_config::SharedConfig;
use bts_core::bts_entities::BtsEntity;
use bts_core::{BtsNr, Sap};
use bts_saps::control::BtsControl;
use bts_saps::{SapMsg, SapMsgInner};

use super::lifecycle::bts_shutdown;
use crate::ccch::update_capacity;
use crate::timers::TimerId;
use crate::{BtsCtx, BtsEntityTrait};

/// The BTS control entity: reacts to system information updates, shutdown
/// requests and the periodic CCCH load timer.
pub struct BtsCore {
    config: SharedConfig,
}

impl BtsCore {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn rx_control(&mut self, ctx: &mut BtsCtx, ctrl: BtsControl) {
        match ctrl {
            BtsControl::NewSysinfo { bts_nr } => match ctx.registry.get_mut(bts_nr) {
                Some(bts) => {
                    update_capacity(bts);
                }
                None => tracing::warn!("new sysinfo for unknown BTS {}", bts_nr),
            },
            BtsControl::Shutdown { bts_nr, reason } => {
                bts_shutdown(ctx, bts_nr, &reason);
                self.config.state_write().shutdown_pending = ctx.timers.is_pending(TimerId::Shutdown);
            }
            BtsControl::CcchLoadInd { .. } => {
                tracing::warn!("CCCH load indication sent to the BTS core, ignoring");
            }
        }
    }

    fn load_ind(&mut self, ctx: &mut BtsCtx, bts_nr: BtsNr) {
        let Some(bts) = ctx.registry.get_mut(bts_nr) else {
            return;
        };
        let (agch_msgs, pch_msgs) = bts.role.agch.take_counters();
        let agch_queue_len = bts.role.agch.len();
        let period = bts.role.load_ind_period;

        tracing::debug!(
            gt = %ctx.gt,
            "BTS {} CCCH load: {} AGCH, {} PCH, queue {}/{}, paging space {}",
            bts_nr,
            agch_msgs,
            pch_msgs,
            agch_queue_len,
            bts.role.agch.max_length,
            bts.role.paging.buffer_space()
        );
        ctx.queue.push_back(SapMsg::new(
            Sap::Control,
            BtsEntity::Bts,
            BtsEntity::Rsl,
            ctx.gt,
            SapMsgInner::BtsControl(BtsControl::CcchLoadInd {
                bts_nr,
                pch_msgs,
                agch_msgs,
                agch_queue_len,
            }),
        ));
        ctx.timers.schedule(TimerId::LoadInd(bts_nr), Duration::from_secs(period as u64));
    }
}

impl BtsEntityTrait for BtsCore {
    fn entity(&self) -> BtsEntity {
        BtsEntity::Bts
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.config = config;
    }

    fn rx_prim(&mut self, ctx: &mut BtsCtx, message: SapMsg) {
        tracing::debug!("rx_prim: {:?} {}", message.sap, message.msg);
        match message.msg {
            SapMsgInner::BtsControl(ctrl) => self.rx_control(ctx, ctrl),
            _ => panic!("unexpected message {}", message.msg),
        }
    }

    fn timer_expired(&mut self, ctx: &mut BtsCtx, timer: TimerId) {
        match timer {
            TimerId::LoadInd(bts_nr) => self.load_ind(ctx, bts_nr),
            TimerId::Shutdown => tracing::warn!("shutdown timer delivered to the BTS core"),
        }
    }
}
