use bts_core::bts_entities::BtsEntity;
use bts_entities::{BtsCtx, BtsEntityTrait};
use bts_saps::SapMsg;

/// A BTS entity sink for testing purposes
/// Collects all received SapMsg messages for later inspection
pub struct Sink {
    component: BtsEntity,
    msgqueue: Vec<SapMsg>,
}

impl Sink {
    pub fn new(component: BtsEntity) -> Self {
        Self {
            component,
            msgqueue: vec![],
        }
    }

    pub fn take_msgqueue(&mut self) -> Vec<SapMsg> {
        std::mem::take(&mut self.msgqueue)
    }
}

impl BtsEntityTrait for Sink {
    fn entity(&self) -> BtsEntity {
        self.component
    }

    fn rx_prim(&mut self, _ctx: &mut BtsCtx, message: SapMsg) {
        tracing::debug!("rx_prim: {:?}", message);
        self.msgqueue.push(message);
    }
}
