use clap::Parser;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bts_config::{SharedConfig, toml_config};
use bts_core::bts_entities::BtsEntity;
use bts_core::{GsmTime, Sap, debug};
use bts_entities::abis::AbisBs;
use bts_entities::bts::BtsCore;
use bts_entities::bts::lifecycle::bts_init;
use bts_entities::external::{L1SapHandler, OmlHandler, RslHandler};
use bts_entities::fdset::PollSet;
use bts_entities::l1::msg_queue::queues_for;
use bts_entities::l1::{L1If, MsgqOpener};
use bts_entities::model::SysmoBtsModel;
use bts_entities::{MessageRouter, StackExit};
use bts_saps::l1::L1Control;
use bts_saps::{SapMsg, SapMsgInner};

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Builds the router with every entity of the sysmoBTS process
fn build_bts_stack(cfg: &SharedConfig) -> MessageRouter {
    let config = cfg.config();
    let model = SysmoBtsModel::new(&config.abis.model_name, config.l1.hw_variant);
    let mut router = MessageRouter::new(cfg.clone(), Box::new(PollSet::new()), Box::new(model));

    let l1if = L1If::new(cfg.clone(), Box::new(MsgqOpener));
    let l1sap = L1SapHandler::new(cfg.clone());
    let bts = BtsCore::new(cfg.clone());
    let oml = OmlHandler::new(cfg.clone());
    let rsl = RslHandler::new(cfg.clone());
    router.register_entity(Box::new(l1if));
    router.register_entity(Box::new(l1sap));
    router.register_entity(Box::new(bts));
    router.register_entity(Box::new(oml));
    router.register_entity(Box::new(rsl));

    match config.abis.remote_host.as_deref() {
        Some(remote_host) => match AbisBs::open(cfg.clone(), remote_host) {
            Ok(abis) => {
                router.register_entity(Box::new(abis));
                eprintln!(" -> Abis/IP towards {}:{}", remote_host, config.abis.remote_port);
            }
            Err(e) => {
                eprintln!("Failed to start Abis worker: {}", e);
                std::process::exit(1);
            }
        },
        None => tracing::warn!("no abis.remote_host configured, running without BSC"),
    }

    router.set_gsm_time(GsmTime::default());
    router
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "sysmoBTS control process",
    long_about = "Runs the BTS control core for sysmocom sysmoBTS hardware using the provided TOML configuration file"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML config with BTS, Abis and L1 parameters")]
    config: String,
}

fn main() {
    eprintln!("sysmobts-bts {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = match debug::setup_logging_default(cfg.config().debug_log.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to open debug log: {}", e);
            std::process::exit(1);
        }
    };

    let mut router = build_bts_stack(&cfg);

    let config = cfg.config();
    if let Err(e) = router.with_ctx(|ctx| bts_init(ctx, &config)) {
        tracing::error!("BTS init failed: {}", e);
        std::process::exit(1);
    }

    for queue in queues_for(config.l1.hw_variant) {
        router.submit_message(SapMsg::new(
            Sap::L1cSap,
            BtsEntity::Bts,
            BtsEntity::L1If,
            GsmTime::default(),
            SapMsgInner::L1ControlReq(L1Control::Open(*queue)),
        ));
    }
    router.deliver_all_messages();

    // Ctrl+C starts the orderly shutdown; the loop exits once its delay has passed
    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        s.store(true, Ordering::SeqCst);
    }) {
        tracing::error!("failed to set Ctrl+C handler: {}", e);
        std::process::exit(1);
    }

    let StackExit::Shutdown(code) = router.run(&stop);
    tracing::info!("exiting with code {}", code);
    // Entities are dropped before exit, which stops the Abis worker
    drop(router);
    std::process::exit(code);
}
