use std::sync::{Arc, RwLock};

use bts_core::{BtsNr, GsmBand};

use super::stack_config_l1::CfgL1;

/// Maximum number of TRX per BTS; the PCU INFO indication carries eight.
pub const MAX_TRX: u8 = 8;

/// Per-BTS settings
#[derive(Debug, Clone)]
pub struct CfgBts {
    pub bts_nr: BtsNr,
    pub band: GsmBand,
    pub num_trx: u8,
    /// Overrides the model name as IPA unit name
    pub description: Option<String>,
    pub site_id: u16,
    pub bts_id: u16,
    /// Supported A5 algorithms, A5/1 = bit 0
    pub ciphers: u8,
    pub radio_link_timeout: u8,
    pub rtp_jitter_buf_ms: u32,
    pub max_ta: u8,
    pub paging_queue_size: usize,
    /// CCCH load indication period in seconds
    pub load_ind_period: u32,
    pub dl_tch_queue_max: usize,
}

impl Default for CfgBts {
    fn default() -> Self {
        Self {
            bts_nr: 0,
            band: GsmBand::Dcs1800,
            num_trx: 1,
            description: None,
            site_id: 1801,
            bts_id: 0,
            ciphers: 0,
            radio_link_timeout: 32,
            rtp_jitter_buf_ms: 100,
            max_ta: 63,
            paging_queue_size: 200,
            load_ind_period: 112,
            dl_tch_queue_max: 16,
        }
    }
}

/// Abis/IP transport settings
#[derive(Debug, Clone)]
pub struct CfgAbis {
    /// BSC address; no Abis connection is attempted if unset
    pub remote_host: Option<String>,
    pub remote_port: u16,
    pub model_name: String,
}

impl Default for CfgAbis {
    fn default() -> Self {
        Self {
            remote_host: None,
            remote_port: 3002,
            model_name: "sysmoBTS".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CfgShutdown {
    /// Delay between a shutdown request and process exit
    pub delay_secs: u64,
    pub exit_code: i32,
}

impl Default for CfgShutdown {
    fn default() -> Self {
        Self { delay_secs: 3, exit_code: 42 }
    }
}

#[derive(Debug, Clone)]
pub struct StackConfig {
    pub debug_log: Option<String>,
    pub bts: CfgBts,
    pub abis: CfgAbis,
    pub l1: CfgL1,
    pub shutdown: CfgShutdown,
}

impl StackConfig {
    pub fn new(num_trx: u8) -> Self {
        StackConfig {
            debug_log: None,
            bts: CfgBts { num_trx, ..Default::default() },
            abis: CfgAbis::default(),
            l1: CfgL1::default(),
            shutdown: CfgShutdown::default(),
        }
    }

    /// Validate that all required configuration fields are properly set.
    pub fn validate(&self) -> Result<(), &str> {
        if self.bts.num_trx == 0 {
            return Err("bts.num_trx must be at least 1");
        }
        if self.bts.num_trx > MAX_TRX {
            return Err("bts.num_trx must not exceed 8");
        }
        if self.bts.dl_tch_queue_max == 0 {
            return Err("bts.dl_tch_queue_max must be at least 1");
        }
        if self.l1.sys_prim_size == 0 || self.l1.l1_prim_size == 0 {
            return Err("l1 primitive sizes must be non-zero");
        }
        if self.l1.write_queue_depth == 0 {
            return Err("l1.write_queue_depth must be at least 1");
        }
        if self.l1.read_batch == 0 {
            return Err("l1.read_batch must be at least 1");
        }
        if self.l1.dev_dir.is_empty() {
            return Err("l1.dev_dir must not be empty");
        }
        Ok(())
    }
}

/// Mutable, stack-editable state (mutex-protected).
#[derive(Debug, Clone, Default)]
pub struct StackState {
    /// Abis transport towards the BSC is up
    pub abis_connected: bool,
    /// A delayed shutdown has been armed
    pub shutdown_pending: bool,
}

/// Global shared configuration: immutable config + mutable state.
#[derive(Clone)]
pub struct SharedConfig {
    /// Read-only configuration (immutable after construction).
    cfg: Arc<StackConfig>,
    /// Mutable state guarded with RwLock (write by the stack, read by others).
    state: Arc<RwLock<StackState>>,
}

impl SharedConfig {
    pub fn new(num_trx: u8) -> Self {
        Self::from_config(StackConfig::new(num_trx))
    }

    pub fn from_config(cfg: StackConfig) -> Self {
        Self::from_parts(cfg, StackState::default())
    }

    pub fn from_parts(cfg: StackConfig, state: StackState) -> Self {
        // Check config for validity before returning the SharedConfig object
        match cfg.validate() {
            Ok(_) => {}
            Err(e) => panic!("Invalid stack configuration: {}", e),
        }

        Self {
            cfg: Arc::new(cfg),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }

    /// Read guard for mutable state.
    pub fn state_read(&self) -> std::sync::RwLockReadGuard<'_, StackState> {
        self.state.read().expect("StackState RwLock blocked")
    }

    /// Write guard for mutable state.
    pub fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, StackState> {
        self.state.write().expect("StackState RwLock blocked")
    }
}
