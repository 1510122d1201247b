use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bts_config::SharedConfig;
use bts_core::{GsmTime, bts_entities::BtsEntity};
use bts_saps::SapMsg;

use crate::bts::lifecycle;
use crate::bts::registry::BtsRegistry;
use crate::fdset::FdRegistry;
use crate::model::BtsModel;
use crate::timers::{TimerId, Timers};
use crate::{BtsCtx, BtsEntityTrait};

/// Upper bound for a single poll, so the stop flag is noticed
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Default)]
pub enum MessagePrio {
    Immediate,
    #[default]
    Normal,
}

pub struct MessageQueue {
    messages: VecDeque<SapMsg>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        Self { messages: VecDeque::new() }
    }

    pub fn push_back(&mut self, message: SapMsg) {
        self.messages.push_back(message);
    }

    pub fn push_prio(&mut self, message: SapMsg, prio: MessagePrio) {
        match prio {
            MessagePrio::Immediate => {
                // Insert at the front for immediate processing
                self.messages.push_front(message);
            }
            MessagePrio::Normal => {
                self.messages.push_back(message);
            }
        }
    }

    pub fn pop_front(&mut self) -> Option<SapMsg> {
        self.messages.pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Why the event loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackExit {
    /// The delayed shutdown timer fired; exit with this code
    Shutdown(i32),
}

pub struct MessageRouter {
    config: SharedConfig,
    entities: HashMap<BtsEntity, Box<dyn BtsEntityTrait>>,
    msg_queue: MessageQueue,
    timers: Timers,
    fds: Box<dyn FdRegistry>,
    registry: BtsRegistry,
    model: Box<dyn BtsModel>,

    /// Last GSM time reported by the DSP, stamped on new messages
    gt: GsmTime,
}

impl MessageRouter {
    pub fn new(config: SharedConfig, fds: Box<dyn FdRegistry>, model: Box<dyn BtsModel>) -> Self {
        Self {
            config,
            entities: HashMap::new(),
            msg_queue: MessageQueue::new(),
            timers: Timers::new(),
            fds,
            registry: BtsRegistry::new(),
            model,
            gt: GsmTime::default(),
        }
    }

    pub fn set_gsm_time(&mut self, gt: GsmTime) {
        self.gt = gt;
    }

    pub fn register_entity(&mut self, entity: Box<dyn BtsEntityTrait>) {
        let comp_type = entity.entity();
        tracing::debug!("register_entity {:?}", comp_type);
        self.entities.insert(comp_type, entity);
    }

    /// Returns a mut ref to a component of the requested type
    pub fn get_entity(&mut self, comp: BtsEntity) -> Option<&mut dyn BtsEntityTrait> {
        self.entities.get_mut(&comp).map(|entity| entity.as_mut())
    }

    pub fn registry(&self) -> &BtsRegistry {
        &self.registry
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Splits the router into its entity table and the context handed to entities
    fn split(&mut self) -> (&mut HashMap<BtsEntity, Box<dyn BtsEntityTrait>>, BtsCtx<'_>) {
        let ctx = BtsCtx {
            queue: &mut self.msg_queue,
            timers: &mut self.timers,
            fds: self.fds.as_mut(),
            registry: &mut self.registry,
            model: self.model.as_mut(),
            gt: self.gt,
        };
        (&mut self.entities, ctx)
    }

    /// Runs `f` with the same context entities get, for setup code and tests
    pub fn with_ctx<R>(&mut self, f: impl FnOnce(&mut BtsCtx) -> R) -> R {
        let (_, mut ctx) = self.split();
        f(&mut ctx)
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        tracing::debug!("submit_message {:?}: {:?} -> {:?}", message.get_sap(), message.get_source(), message.get_dest());
        self.msg_queue.push_back(message);
    }

    pub fn deliver_message(&mut self) {
        let Some(message) = self.msg_queue.pop_front() else {
            return;
        };
        tracing::debug!(
            "deliver_message: {:?}: {:?} -> {:?} {}",
            message.get_sap(),
            message.get_source(),
            message.get_dest(),
            message.msg
        );

        let dest = *message.get_dest();
        let (entities, mut ctx) = self.split();
        if let Some(entity) = entities.get_mut(&dest) {
            entity.rx_prim(&mut ctx, message);
        } else {
            tracing::warn!(
                "deliver_message: entity {:?} not found for {:?}: {:?} -> {:?}",
                dest,
                message.get_sap(),
                message.get_source(),
                message.get_dest()
            );
        }
    }

    pub fn deliver_all_messages(&mut self) {
        while !self.msg_queue.is_empty() {
            self.deliver_message();
        }
    }

    pub fn get_msgqueue_len(&self) -> usize {
        self.msg_queue.len()
    }

    /// Waits for descriptor readiness and hands each event to the owning entity
    pub fn poll_io(&mut self, timeout: Duration) {
        let ready = match self.fds.wait(timeout) {
            Ok(ready) => ready,
            Err(e) => {
                tracing::error!("poll failed: {}", e);
                return;
            }
        };

        for readiness in ready {
            let (entities, mut ctx) = self.split();
            match entities.get_mut(&readiness.token.entity) {
                Some(entity) => entity.fd_ready(&mut ctx, readiness.token.id, readiness),
                None => tracing::warn!("poll_io: no entity {:?} for ready fd", readiness.token.entity),
            }
        }
    }

    /// Gives every entity a chance to pick up work from outside the loop
    pub fn poll_entities(&mut self) {
        let (entities, mut ctx) = self.split();
        for entity in entities.values_mut() {
            entity.poll(&mut ctx);
        }
    }

    /// Fires all timers due at `now`. Returns the exit request if the shutdown timer fired.
    pub fn fire_timers(&mut self, now: Instant) -> Option<StackExit> {
        let expired = self.timers.take_expired(now);
        for timer in expired {
            match timer.owner() {
                None => {
                    // Only the shutdown timer is handled by the router itself
                    let code = self.config.config().shutdown.exit_code;
                    tracing::info!("shutdown timer expired, exiting with code {}", code);
                    return Some(StackExit::Shutdown(code));
                }
                Some(owner) => {
                    let (entities, mut ctx) = self.split();
                    match entities.get_mut(&owner) {
                        Some(entity) => entity.timer_expired(&mut ctx, timer),
                        None => tracing::warn!("fire_timers: no entity {:?} for {:?}", owner, timer),
                    }
                    self.deliver_all_messages();
                }
            }
        }
        self.config.state_write().shutdown_pending = self.timers.is_pending(TimerId::Shutdown);
        None
    }

    /// Starts an orderly shutdown of every registered BTS
    pub fn request_shutdown(&mut self, reason: &str) {
        self.with_ctx(|ctx| lifecycle::bts_shutdown_all(ctx, reason));
        self.deliver_all_messages();
        self.config.state_write().shutdown_pending = self.timers.is_pending(TimerId::Shutdown);
    }

    /// One iteration of the cooperative event loop
    pub fn run_once(&mut self, max_wait: Duration) -> Option<StackExit> {
        let now = Instant::now();
        let timeout = match self.timers.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(max_wait),
            None => max_wait,
        };

        self.poll_io(timeout);
        self.poll_entities();
        self.deliver_all_messages();
        self.fire_timers(Instant::now())
    }

    /// Runs until the shutdown timer fires. Setting `stop` requests a shutdown.
    pub fn run(&mut self, stop: &AtomicBool) -> StackExit {
        loop {
            if stop.swap(false, Ordering::SeqCst) {
                tracing::info!("stop requested");
                self.request_shutdown("SIGINT");
            }
            if let Some(exit) = self.run_once(MAX_POLL_INTERVAL) {
                return exit;
            }
        }
    }
}
