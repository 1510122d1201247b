mod common;

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bts_config::HwVariant;
use bts_core::bts_entities::BtsEntity;
use bts_core::{GsmTime, Sap, debug};
use bts_entities::StackExit;
use bts_entities::abis::{sign_link_down, sign_link_up};
use bts_entities::bts::lifecycle::bts_init;
use bts_entities::l1::L1If;
use bts_entities::l1::msg_queue::queues_for;
use bts_entities::model::{BtsInitError, SysmoBtsModel};
use bts_entities::timers::TimerId;
use bts_saps::abis::SignLinkKind;
use bts_saps::control::BtsControl;
use bts_saps::l1::L1Control;
use bts_saps::{SapMsg, SapMsgInner};
use common::fakes::ModelCall;
use common::{ComponentTest, default_test_config};

fn shutdown_req(reason: &str) -> SapMsg {
    SapMsg::new(
        Sap::Control,
        BtsEntity::Bts,
        BtsEntity::Bts,
        GsmTime::default(),
        SapMsgInner::BtsControl(BtsControl::Shutdown {
            bts_nr: 0,
            reason: reason.to_string(),
        }),
    )
}

#[test]
fn test_init_rolls_back_on_model_failure() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::with_failing_model(default_test_config());

    let err = test.init_bts().unwrap_err();
    assert!(matches!(err, BtsInitError::Model { .. }));
    assert!(test.router.registry().is_empty());
    assert!(!test.router.timers().is_pending(TimerId::LoadInd(0)));
    assert_eq!(test.take_model_calls(), vec![ModelCall::Init(0)]);
}

#[test]
fn test_init_twice() {
    let mut test = ComponentTest::new(default_test_config());
    assert_eq!(test.init_bts().unwrap(), 0);
    assert!(matches!(test.init_bts(), Err(BtsInitError::AlreadyRegistered(0))));
    assert_eq!(test.router.registry().len(), 1);
}

#[test]
fn test_shutdown_is_idempotent() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new(default_test_config());
    test.populate_entities(vec![BtsEntity::Bts], vec![]);
    test.init_bts().unwrap();
    test.take_model_calls();

    test.submit_message(shutdown_req("test"));
    test.submit_message(shutdown_req("again"));
    test.deliver_all_messages();

    assert_eq!(
        test.take_model_calls(),
        vec![
            ModelCall::TrxDeactRf(0),
            ModelCall::TrxClose(0),
            ModelCall::TrxDeactRf(1),
            ModelCall::TrxClose(1),
        ]
    );
    assert!(test.config.state_read().shutdown_pending);
    assert!(test.router.timers().is_pending(TimerId::Shutdown));

    // The router's own request is absorbed the same way
    test.router.request_shutdown("SIGINT");
    assert!(test.take_model_calls().is_empty());

    let exit = test.router.fire_timers(Instant::now() + Duration::from_secs(1));
    assert_eq!(exit, Some(StackExit::Shutdown(42)));
}

#[test]
fn test_shutdown_delay() {
    let mut config = default_test_config();
    config.shutdown.delay_secs = 3;
    config.shutdown.exit_code = 7;
    let mut test = ComponentTest::new(config);
    test.populate_entities(vec![BtsEntity::Bts], vec![]);
    test.init_bts().unwrap();

    let start = Instant::now();
    test.router.request_shutdown("test");
    assert_eq!(test.router.fire_timers(start + Duration::from_secs(1)), None);
    assert!(test.config.state_read().shutdown_pending);
    assert_eq!(
        test.router.fire_timers(start + Duration::from_secs(4)),
        Some(StackExit::Shutdown(7))
    );
}

#[test]
fn test_shutdown_closes_trx_of_every_bts() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new(default_test_config());
    test.populate_entities(vec![BtsEntity::Bts], vec![]);
    test.init_bts().unwrap();

    let mut second = default_test_config();
    second.bts.bts_nr = 1;
    second.bts.num_trx = 1;
    second.shutdown.delay_secs = 2;
    assert_eq!(test.router.with_ctx(|ctx| bts_init(ctx, &second)).unwrap(), 1);
    assert_eq!(test.router.registry().len(), 2);
    test.take_model_calls();

    let start = Instant::now();
    test.router.request_shutdown("SIGINT");
    assert_eq!(
        test.take_model_calls(),
        vec![
            ModelCall::TrxDeactRf(0),
            ModelCall::TrxClose(0),
            ModelCall::TrxDeactRf(1),
            ModelCall::TrxClose(1),
            ModelCall::TrxDeactRf(0),
            ModelCall::TrxClose(0),
        ]
    );

    // One exit timer, armed with the longest delay
    assert_eq!(test.router.fire_timers(start + Duration::from_secs(1)), None);
    assert_eq!(
        test.router.fire_timers(start + Duration::from_secs(3)),
        Some(StackExit::Shutdown(42))
    );
}

#[test]
fn test_stop_flag_ends_run_loop() {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new(default_test_config());
    test.populate_entities(vec![BtsEntity::Bts], vec![]);
    test.init_bts().unwrap();

    let stop = AtomicBool::new(true);
    assert_eq!(test.router.run(&stop), StackExit::Shutdown(42));
    assert!(test.take_model_calls().contains(&ModelCall::TrxClose(1)));
}

#[test]
fn test_sysmo_abis_loss_shuts_down() {
    debug::setup_logging_verbose();
    let mut config = default_test_config();
    config.bts.num_trx = 1;
    let model = SysmoBtsModel::new("sysmoBTS", HwVariant::V2);
    let mut test = ComponentTest::with_model(config, Box::new(model), Arc::new(Mutex::new(Vec::new())));
    test.populate_entities(vec![BtsEntity::Bts, BtsEntity::L1If], vec![BtsEntity::Oml, BtsEntity::Rsl]);
    test.init_bts().unwrap();
    assert_eq!(test.router.registry().get(0).unwrap().role.ciphers & 0b111, 0b111);

    for queue in queues_for(HwVariant::V2) {
        test.submit_message(SapMsg::new(
            Sap::L1cSap,
            BtsEntity::Bts,
            BtsEntity::L1If,
            GsmTime::default(),
            SapMsgInner::L1ControlReq(L1Control::Open(*queue)),
        ));
    }
    test.deliver_all_messages();
    assert_eq!(test.fds.num_registered(), 8);

    // OML up switches the RF on
    test.router.with_ctx(|ctx| sign_link_up(ctx, 0, SignLinkKind::Oml)).unwrap();
    test.deliver_all_messages();
    assert!(test.entity_mut::<L1If>(BtsEntity::L1If).rf_active(0));

    // Losing the BSC takes everything down
    test.router.with_ctx(|ctx| sign_link_down(ctx, 0));
    test.deliver_all_messages();
    assert!(!test.entity_mut::<L1If>(BtsEntity::L1If).rf_active(0));
    assert_eq!(test.fds.num_registered(), 0);
    assert!(test.router.timers().is_pending(TimerId::Shutdown));
    assert_eq!(
        test.router.fire_timers(Instant::now() + Duration::from_secs(1)),
        Some(StackExit::Shutdown(42))
    );
}
