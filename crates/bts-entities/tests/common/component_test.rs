use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use bts_config::{FramingFaultPolicy, SharedConfig, StackConfig, StackState};
use bts_core::BtsNr;
use bts_core::bts_entities::BtsEntity;
use bts_entities::abis::{AbisBs, AbisCommand, AbisEvent};
use bts_entities::bts::BtsCore;
use bts_entities::bts::lifecycle::bts_init;
use bts_entities::external::{L1SapHandler, OmlHandler, RslHandler};
use bts_entities::l1::L1If;
use bts_entities::model::{BtsInitError, BtsModel};
use bts_entities::{BtsEntityTrait, MessageRouter};
use bts_saps::SapMsg;
use crossbeam_channel::{Receiver, Sender, unbounded};

use super::fakes::{FakeDsp, FakeFds, FakeModel, ModelCall};
use super::sink::Sink;

/// Creates a default config for testing. It can still be modified as needed
/// before passing it to the ComponentTest constructor
pub fn default_test_config() -> StackConfig {
    let mut cfg = StackConfig::new(2);
    cfg.bts.site_id = 1801;
    cfg.l1.sys_prim_size = 8;
    cfg.l1.l1_prim_size = 16;
    cfg.l1.write_queue_depth = 4;
    cfg.l1.read_batch = 3;
    cfg.l1.framing_fault = FramingFaultPolicy::Log;
    cfg.shutdown.delay_secs = 0;
    cfg
}

/// Infrastructure for testing BTS entities
/// Quick setup of the router with fake hardware underneath
/// Supports optional sinks for collecting messages for later inspection
pub struct ComponentTest {
    pub config: SharedConfig,
    pub router: MessageRouter,
    pub sinks: Vec<BtsEntity>,
    pub model_calls: Arc<Mutex<Vec<ModelCall>>>,
    pub fds: FakeFds,
    pub dsp: FakeDsp,
    /// Number of times the framing fault hook ran
    pub fault_hits: Arc<AtomicU32>,
    /// Test side of the Abis worker channels
    pub abis_events: Option<Sender<AbisEvent>>,
    pub abis_commands: Option<Receiver<AbisCommand>>,
}

impl ComponentTest {
    pub fn new(config: StackConfig) -> Self {
        let model_calls = Arc::new(Mutex::new(Vec::new()));
        let model = FakeModel::new(model_calls.clone());
        Self::with_model(config, Box::new(model), model_calls)
    }

    /// Same as new(), but the model refuses to initialise the BTS
    pub fn with_failing_model(config: StackConfig) -> Self {
        let model_calls = Arc::new(Mutex::new(Vec::new()));
        let mut model = FakeModel::new(model_calls.clone());
        model.fail_init = true;
        Self::with_model(config, Box::new(model), model_calls)
    }

    pub fn with_model(config: StackConfig, model: Box<dyn BtsModel>, model_calls: Arc<Mutex<Vec<ModelCall>>>) -> Self {
        let shared_config = SharedConfig::from_parts(config, StackState::default());
        let fds = FakeFds::default();
        let router = MessageRouter::new(shared_config.clone(), Box::new(fds.clone()), model);

        Self {
            config: shared_config,
            router,
            sinks: vec![],
            model_calls,
            fds,
            dsp: FakeDsp::default(),
            fault_hits: Arc::new(AtomicU32::new(0)),
            abis_events: None,
            abis_commands: None,
        }
    }

    pub fn get_shared_config(&self) -> SharedConfig {
        self.config.clone()
    }

    /// Creates the BTS described by the configuration
    pub fn init_bts(&mut self) -> Result<BtsNr, BtsInitError> {
        let cfg = self.config.config();
        self.router.with_ctx(|ctx| bts_init(ctx, &cfg))
    }

    pub fn populate_entities(&mut self, components: Vec<BtsEntity>, sinks: Vec<BtsEntity>) {
        for component in components.iter() {
            match component {
                BtsEntity::L1If => {
                    let hits = self.fault_hits.clone();
                    let l1if = L1If::new(self.config.clone(), Box::new(self.dsp.opener())).with_fault_hook(Box::new(move |_| {
                        hits.fetch_add(1, Ordering::SeqCst);
                    }));
                    self.register_entity(l1if);
                }
                BtsEntity::L1Sap => {
                    let l1sap = L1SapHandler::new(self.config.clone());
                    self.register_entity(l1sap);
                }
                BtsEntity::Abis => {
                    let (event_sender, event_receiver) = unbounded();
                    let (command_sender, command_receiver) = unbounded();
                    let abis = AbisBs::with_channels(self.config.clone(), event_receiver, command_sender);
                    self.abis_events = Some(event_sender);
                    self.abis_commands = Some(command_receiver);
                    self.register_entity(abis);
                }
                BtsEntity::Oml => {
                    let oml = OmlHandler::new(self.config.clone());
                    self.register_entity(oml);
                }
                BtsEntity::Rsl => {
                    let rsl = RslHandler::new(self.config.clone());
                    self.register_entity(rsl);
                }
                BtsEntity::Bts => {
                    let bts = BtsCore::new(self.config.clone());
                    self.register_entity(bts);
                }
            }
        }

        // Create sinks for debugging / message collection
        self.create_sinks(sinks);
    }

    fn create_sinks(&mut self, sinks: Vec<BtsEntity>) {
        for sink in sinks.iter() {
            assert!(!self.sinks.contains(sink), "Sink already exists: {:?}", sink);
            assert!(self.router.get_entity(*sink).is_none(), "Sink already registered as entity: {:?}", sink);

            self.sinks.push(*sink);
            self.register_entity(Sink::new(*sink));
        }
    }

    pub fn register_entity<T: 'static + BtsEntityTrait>(&mut self, entity: T) {
        self.router.register_entity(Box::new(entity));
    }

    pub fn submit_message(&mut self, message: SapMsg) {
        self.router.submit_message(message);
    }

    pub fn deliver_all_messages(&mut self) {
        self.router.deliver_all_messages();
    }

    /// Sends an event as if it came from the Abis worker, then runs one poll round
    pub fn abis_event(&mut self, event: AbisEvent) {
        let sender = self.abis_events.as_ref().expect("Abis entity not populated");
        sender.send(event).unwrap();
        self.router.poll_entities();
        self.router.deliver_all_messages();
    }

    pub fn take_model_calls(&self) -> Vec<ModelCall> {
        std::mem::take(&mut *self.model_calls.lock().unwrap())
    }

    pub fn entity_mut<T: 'static>(&mut self, entity: BtsEntity) -> &mut T {
        self.router
            .get_entity(entity)
            .and_then(|e| e.as_any_mut().downcast_mut::<T>())
            .expect("entity not registered or of another type")
    }

    pub fn dump_sinks(&mut self) -> Vec<SapMsg> {
        let mut msgs = vec![];
        for sink in self.sinks.iter() {
            if let Some(component) = self.router.get_entity(*sink) {
                if let Some(sink) = component.as_any_mut().downcast_mut::<Sink>() {
                    let mut sink_msgs = sink.take_msgqueue();
                    msgs.append(&mut sink_msgs);
                }
            }
        }
        msgs
    }
}
