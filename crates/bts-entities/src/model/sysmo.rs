use bts_config::HwVariant;
use bts_core::bts_entities::BtsEntity;
use bts_core::{GsmTime, Sap};
use bts_saps::control::BtsControl;
use bts_saps::l1::L1Control;
use bts_saps::{SapMsg, SapMsgInner};

use super::{BtsInitError, BtsModel};
use crate::bts::gsm_data::{Bts, Trx};
use crate::l1::msg_queue::queues_for;
use crate::{MessagePrio, MessageQueue};

/// A5/1, A5/2 and A5/3 are implemented by the DSP
const SYSMO_CIPHERS: u8 = 0b111;

/// sysmoBTS: one TRX per DSP, driven through the msgq devices
pub struct SysmoBtsModel {
    name: String,
    hw_variant: HwVariant,
}

impl SysmoBtsModel {
    pub fn new(name: &str, hw_variant: HwVariant) -> Self {
        Self {
            name: name.to_string(),
            hw_variant,
        }
    }

    fn l1_control(queue: &mut MessageQueue, ctrl: L1Control) {
        queue.push_back(SapMsg::new(
            Sap::L1cSap,
            BtsEntity::Bts,
            BtsEntity::L1If,
            GsmTime::default(),
            SapMsgInner::L1ControlReq(ctrl),
        ));
    }
}

impl BtsModel for SysmoBtsModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, bts: &mut Bts) -> Result<(), BtsInitError> {
        if bts.trx.len() != 1 {
            return Err(BtsInitError::Model {
                model: self.name.clone(),
                reason: format!("supports exactly one TRX, {} configured", bts.trx.len()),
            });
        }
        bts.role.ciphers |= SYSMO_CIPHERS;
        Ok(())
    }

    fn oml_estab(&mut self, queue: &mut MessageQueue, bts: &Bts) {
        for trx in &bts.trx {
            Self::l1_control(queue, L1Control::ActivateRf { trx_nr: trx.nr, on: true });
        }
    }

    fn abis_close(&mut self, queue: &mut MessageQueue, bts: &Bts) {
        // Without a BSC there is nothing left to do, start over
        queue.push_prio(
            SapMsg::new(
                Sap::Control,
                BtsEntity::Bts,
                BtsEntity::Bts,
                GsmTime::default(),
                SapMsgInner::BtsControl(BtsControl::Shutdown {
                    bts_nr: bts.nr,
                    reason: "Abis close".to_string(),
                }),
            ),
            MessagePrio::Immediate,
        );
    }

    fn trx_deact_rf(&mut self, queue: &mut MessageQueue, trx: &Trx) {
        Self::l1_control(queue, L1Control::ActivateRf { trx_nr: trx.nr, on: false });
    }

    fn trx_close(&mut self, queue: &mut MessageQueue, _trx: &Trx) {
        for q in queues_for(self.hw_variant) {
            Self::l1_control(queue, L1Control::Close(*q));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bts_config::CfgBts;

    #[test]
    fn test_init_rejects_multi_trx() {
        let mut model = SysmoBtsModel::new("sysmoBTS", HwVariant::V2);
        let mut bts = Bts::new(&CfgBts { num_trx: 2, ..Default::default() });
        assert!(model.init(&mut bts).is_err());

        let mut bts = Bts::new(&CfgBts::default());
        model.init(&mut bts).unwrap();
        assert_eq!(bts.role.ciphers, SYSMO_CIPHERS);
    }

    #[test]
    fn test_trx_close_closes_all_queues() {
        let mut model = SysmoBtsModel::new("sysmoBTS", HwVariant::V1);
        let bts = Bts::new(&CfgBts::default());
        let mut queue = MessageQueue::new();
        model.trx_close(&mut queue, &bts.trx[0]);
        assert_eq!(queue.len(), 2);
        while let Some(msg) = queue.pop_front() {
            assert_eq!(msg.dest, BtsEntity::L1If);
            assert!(matches!(msg.msg, SapMsgInner::L1ControlReq(L1Control::Close(_))));
        }
    }
}
