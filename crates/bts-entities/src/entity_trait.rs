use as_any::AsAny;
use bts_config::SharedConfig;
use bts_core::GsmTime;
use bts_saps::SapMsg;

use crate::MessageQueue;
use crate::bts::registry::BtsRegistry;
use crate::fdset::{FdRegistry, Readiness};
use crate::model::BtsModel;
use crate::timers::{TimerId, Timers};

/// Everything an entity may touch while handling an event.
/// Borrowed from the MessageRouter for the duration of one callback.
pub struct BtsCtx<'a> {
    pub queue: &'a mut MessageQueue,
    pub timers: &'a mut Timers,
    pub fds: &'a mut dyn FdRegistry,
    pub registry: &'a mut BtsRegistry,
    pub model: &'a mut dyn BtsModel,
    /// Last known GSM time
    pub gt: GsmTime,
}

/// Trait for BTS entities
/// Used by MessageRouter for passing messages and events between entities
pub trait BtsEntityTrait: Send + AsAny {
    /// Returns the entity type identifier
    fn entity(&self) -> bts_core::bts_entities::BtsEntity;

    /// Handle incoming SAP primitive
    fn rx_prim(&mut self, ctx: &mut BtsCtx, message: SapMsg);

    /// Update configuration (optional)
    #[allow(dead_code)]
    fn set_config(&mut self, _config: SharedConfig) {}

    /// Called once per loop iteration, before queued messages are delivered
    fn poll(&mut self, _ctx: &mut BtsCtx) {}

    /// A descriptor this entity registered became ready
    fn fd_ready(&mut self, _ctx: &mut BtsCtx, _id: u32, _readiness: Readiness) {}

    /// A timer owned by this entity expired
    fn timer_expired(&mut self, _ctx: &mut BtsCtx, _timer: TimerId) {}
}
