mod common;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bts_config::{FramingFaultPolicy, HwVariant, StackConfig};
use bts_core::bts_entities::BtsEntity;
use bts_core::{GsmTime, Sap, debug};
use bts_entities::fdset::{FdToken, Interest, Readiness};
use bts_entities::l1::L1If;
use bts_entities::l1::msg_queue::dev_paths;
use bts_entities::l1::transport::{FdDir, token_id};
use bts_saps::l1::{L1Control, L1PrimKind, L1PrimReq, L1Queue};
use bts_saps::{SapMsg, SapMsgInner};
use common::{ComponentTest, default_test_config};

fn setup(config: StackConfig) -> ComponentTest {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new(config);
    test.populate_entities(vec![BtsEntity::L1If], vec![BtsEntity::L1Sap]);
    test
}

fn paths(test: &ComponentTest, queue: L1Queue) -> (PathBuf, PathBuf) {
    dev_paths(&test.config.config().l1, queue).unwrap()
}

fn l1_control(test: &mut ComponentTest, ctrl: L1Control) {
    test.submit_message(SapMsg::new(
        Sap::L1cSap,
        BtsEntity::Bts,
        BtsEntity::L1If,
        GsmTime::default(),
        SapMsgInner::L1ControlReq(ctrl),
    ));
    test.deliver_all_messages();
}

fn token(queue: L1Queue, dir: FdDir) -> FdToken {
    FdToken {
        entity: BtsEntity::L1If,
        id: token_id(queue, dir),
    }
}

fn signal(test: &mut ComponentTest, queue: L1Queue, dir: FdDir) {
    test.fds.push_ready(Readiness {
        token: token(queue, dir),
        readable: dir == FdDir::Read,
        writable: dir == FdDir::Write,
        hangup: false,
    });
    test.router.poll_io(Duration::ZERO);
    test.deliver_all_messages();
}

fn is_open(test: &mut ComponentTest, queue: L1Queue) -> bool {
    test.entity_mut::<L1If>(BtsEntity::L1If).transport().is_open(queue)
}

#[test]
fn test_read_batch_is_capped() {
    let mut test = setup(default_test_config());
    l1_control(&mut test, L1Control::Open(L1Queue::Sys));
    assert!(is_open(&mut test, L1Queue::Sys));
    assert_eq!(test.fds.num_registered(), 2);
    assert_eq!(test.fds.interest_of(token(L1Queue::Sys, FdDir::Read)), Some(Interest::READ));
    assert_eq!(test.fds.interest_of(token(L1Queue::Sys, FdDir::Write)), Some(Interest::NONE));

    let (rd, _) = paths(&test, L1Queue::Sys);
    for i in 0..5u8 {
        test.dsp.push_read(&rd, vec![i; 8]);
    }

    signal(&mut test, L1Queue::Sys, FdDir::Read);
    let msgs = test.dump_sinks();
    assert_eq!(msgs.len(), 3);
    for (i, msg) in msgs.iter().enumerate() {
        match &msg.msg {
            SapMsgInner::L1PrimInd(prim) => {
                assert_eq!(prim.queue, L1Queue::Sys);
                assert_eq!(prim.kind, L1PrimKind::System);
                assert_eq!(prim.data, vec![i as u8; 8]);
            }
            other => panic!("unexpected message {}", other),
        }
    }
    assert_eq!(test.dsp.remaining_reads(&rd), 2);

    // The rest comes with the next notification
    signal(&mut test, L1Queue::Sys, FdDir::Read);
    assert_eq!(test.dump_sinks().len(), 2);
}

#[test]
fn test_framing_fault_is_not_dispatched() {
    let mut test = setup(default_test_config());
    l1_control(&mut test, L1Control::Open(L1Queue::L1));

    let (rd, _) = paths(&test, L1Queue::L1);
    test.dsp.push_read(&rd, vec![1; 16]);
    test.dsp.push_read(&rd, vec![2; 15]);
    test.dsp.push_read(&rd, vec![3; 16]);

    signal(&mut test, L1Queue::L1, FdDir::Read);
    let msgs = test.dump_sinks();
    assert_eq!(msgs.len(), 1);
    assert!(matches!(&msgs[0].msg, SapMsgInner::L1PrimInd(prim) if prim.data == vec![1; 16]));

    // Logged and dropped; the queue stays usable
    assert_eq!(test.entity_mut::<L1If>(BtsEntity::L1If).framing_faults, 1);
    assert_eq!(test.fault_hits.load(Ordering::SeqCst), 0);
    assert!(is_open(&mut test, L1Queue::L1));

    signal(&mut test, L1Queue::L1, FdDir::Read);
    let msgs = test.dump_sinks();
    assert_eq!(msgs.len(), 1);
    assert!(matches!(&msgs[0].msg, SapMsgInner::L1PrimInd(prim) if prim.data == vec![3; 16]));
}

#[test]
fn test_framing_fault_abort_policy() {
    let mut config = default_test_config();
    config.l1.framing_fault = FramingFaultPolicy::Abort;
    let mut test = setup(config);
    l1_control(&mut test, L1Control::Open(L1Queue::Sys));

    let (rd, _) = paths(&test, L1Queue::Sys);
    // Larger than any primitive
    test.dsp.push_read(&rd, vec![0; 100]);

    signal(&mut test, L1Queue::Sys, FdDir::Read);
    assert!(test.dump_sinks().is_empty());
    assert_eq!(test.fault_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_read_error_closes_queue() {
    let mut test = setup(default_test_config());
    l1_control(&mut test, L1Control::Open(L1Queue::Tch));

    let (rd, _) = paths(&test, L1Queue::Tch);
    test.dsp.push_read_err(&rd, io::ErrorKind::BrokenPipe);
    signal(&mut test, L1Queue::Tch, FdDir::Read);

    assert!(!is_open(&mut test, L1Queue::Tch));
    assert_eq!(test.fds.num_registered(), 0);
}

#[test]
fn test_write_path() {
    let mut test = setup(default_test_config());
    l1_control(&mut test, L1Control::Open(L1Queue::L1));
    let (_, wr) = paths(&test, L1Queue::L1);

    for i in 0..2u8 {
        test.submit_message(SapMsg::new(
            Sap::L1Sap,
            BtsEntity::L1Sap,
            BtsEntity::L1If,
            GsmTime::default(),
            SapMsgInner::L1PrimReq(L1PrimReq {
                queue: L1Queue::L1,
                data: vec![i; 16],
            }),
        ));
    }
    test.deliver_all_messages();
    assert_eq!(test.fds.interest_of(token(L1Queue::L1, FdDir::Write)), Some(Interest::WRITE));

    // One primitive per notification
    signal(&mut test, L1Queue::L1, FdDir::Write);
    assert_eq!(test.dsp.written(&wr), vec![vec![0; 16]]);
    assert_eq!(test.fds.interest_of(token(L1Queue::L1, FdDir::Write)), Some(Interest::WRITE));

    signal(&mut test, L1Queue::L1, FdDir::Write);
    assert_eq!(test.dsp.written(&wr), vec![vec![0; 16], vec![1; 16]]);
    assert_eq!(test.fds.interest_of(token(L1Queue::L1, FdDir::Write)), Some(Interest::NONE));
}

#[test]
fn test_short_write_closes_queue() {
    let mut test = setup(default_test_config());
    l1_control(&mut test, L1Control::Open(L1Queue::Sys));

    test.submit_message(SapMsg::new(
        Sap::L1Sap,
        BtsEntity::L1Sap,
        BtsEntity::L1If,
        GsmTime::default(),
        SapMsgInner::L1PrimReq(L1PrimReq {
            queue: L1Queue::Sys,
            data: vec![7; 8],
        }),
    ));
    test.deliver_all_messages();

    test.dsp.set_short_write(Some(4));
    signal(&mut test, L1Queue::Sys, FdDir::Write);

    assert!(!is_open(&mut test, L1Queue::Sys));
    assert_eq!(test.fds.num_registered(), 0);
}

#[test]
fn test_open_failure_leaves_nothing_behind() {
    let mut test = setup(default_test_config());
    let (_, wr) = paths(&test, L1Queue::Pdtch);
    test.dsp.fail_open(&wr);

    l1_control(&mut test, L1Control::Open(L1Queue::Pdtch));
    assert!(!is_open(&mut test, L1Queue::Pdtch));
    assert_eq!(test.fds.num_registered(), 0);

    // Closing what never opened is harmless
    l1_control(&mut test, L1Control::Close(L1Queue::Pdtch));
    assert_eq!(test.fds.num_registered(), 0);
}

#[test]
fn test_v1_has_no_traffic_queues() {
    let mut config = default_test_config();
    config.l1.hw_variant = HwVariant::V1;
    let mut test = setup(config);

    l1_control(&mut test, L1Control::Open(L1Queue::Tch));
    assert!(!is_open(&mut test, L1Queue::Tch));

    l1_control(&mut test, L1Control::Open(L1Queue::Sys));
    l1_control(&mut test, L1Control::Open(L1Queue::L1));
    assert!(is_open(&mut test, L1Queue::Sys));
    assert!(is_open(&mut test, L1Queue::L1));
    assert_eq!(test.fds.num_registered(), 4);

    l1_control(&mut test, L1Control::Close(L1Queue::Sys));
    l1_control(&mut test, L1Control::Close(L1Queue::Sys));
    assert_eq!(test.fds.num_registered(), 2);
}

#[test]
fn test_rf_activation_tracked_per_trx() {
    let mut test = setup(default_test_config());
    l1_control(&mut test, L1Control::ActivateRf { trx_nr: 0, on: true });
    l1_control(&mut test, L1Control::ActivateRf { trx_nr: 1, on: true });
    l1_control(&mut test, L1Control::ActivateRf { trx_nr: 1, on: false });

    let l1if = test.entity_mut::<L1If>(BtsEntity::L1If);
    assert!(l1if.rf_active(0));
    assert!(!l1if.rf_active(1));
    assert!(!l1if.rf_active(2));
}
