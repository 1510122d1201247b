use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bts_core::GsmBand;
use serde::Deserialize;
use toml::Value;

use super::stack_config::{CfgAbis, CfgBts, CfgShutdown, SharedConfig, StackConfig, StackState};
use super::stack_config_l1::{CfgL1, FramingFaultPolicy, HwVariant};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if !root.bts.extra.is_empty() {
        return Err(format!("Unrecognized fields in bts: {:?}", sorted_keys(&root.bts.extra)).into());
    }
    if let Some(ref abis) = root.abis {
        if !abis.extra.is_empty() {
            return Err(format!("Unrecognized fields in abis: {:?}", sorted_keys(&abis.extra)).into());
        }
    }
    if let Some(ref l1) = root.l1 {
        if !l1.extra.is_empty() {
            return Err(format!("Unrecognized fields in l1: {:?}", sorted_keys(&l1.extra)).into());
        }
    }
    if let Some(ref sd) = root.shutdown {
        if !sd.extra.is_empty() {
            return Err(format!("Unrecognized fields in shutdown: {:?}", sorted_keys(&sd.extra)).into());
        }
    }

    let mut cfg = StackConfig {
        debug_log: root.debug_log,
        bts: CfgBts::default(),
        abis: CfgAbis::default(),
        l1: CfgL1::default(),
        shutdown: CfgShutdown::default(),
    };

    apply_bts_patch(&mut cfg.bts, root.bts);
    if let Some(abis) = root.abis {
        apply_abis_patch(&mut cfg.abis, abis);
    }
    if let Some(l1) = root.l1 {
        apply_l1_patch(&mut cfg.l1, l1);
    }
    if let Some(sd) = root.shutdown {
        if let Some(v) = sd.delay_secs {
            cfg.shutdown.delay_secs = v;
        }
        if let Some(v) = sd.exit_code {
            cfg.shutdown.exit_code = v;
        }
    }

    // Report invalid files as errors rather than tripping the panic in from_parts
    cfg.validate().map_err(|e| format!("Invalid configuration: {}", e))?;

    Ok(SharedConfig::from_parts(cfg, StackState::default()))
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_bts_patch(dst: &mut CfgBts, src: BtsDto) {
    dst.bts_nr = src.bts_nr;
    dst.num_trx = src.num_trx;
    dst.description = src.description;

    if let Some(v) = src.band {
        dst.band = v;
    }
    if let Some(v) = src.site_id {
        dst.site_id = v;
    }
    if let Some(v) = src.bts_id {
        dst.bts_id = v;
    }
    if let Some(v) = src.ciphers {
        dst.ciphers = v;
    }
    if let Some(v) = src.radio_link_timeout {
        dst.radio_link_timeout = v;
    }
    if let Some(v) = src.rtp_jitter_buf_ms {
        dst.rtp_jitter_buf_ms = v;
    }
    if let Some(v) = src.max_ta {
        dst.max_ta = v;
    }
    if let Some(v) = src.paging_queue_size {
        dst.paging_queue_size = v;
    }
    if let Some(v) = src.load_ind_period {
        dst.load_ind_period = v;
    }
    if let Some(v) = src.dl_tch_queue_max {
        dst.dl_tch_queue_max = v;
    }
}

fn apply_abis_patch(dst: &mut CfgAbis, src: AbisDto) {
    dst.remote_host = src.remote_host;
    if let Some(v) = src.remote_port {
        dst.remote_port = v;
    }
    if let Some(v) = src.model_name {
        dst.model_name = v;
    }
}

fn apply_l1_patch(dst: &mut CfgL1, src: L1Dto) {
    if let Some(v) = src.hw_variant {
        dst.hw_variant = v;
    }
    if let Some(v) = src.dev_dir {
        dst.dev_dir = v;
    }
    if let Some(v) = src.sys_prim_size {
        dst.sys_prim_size = v;
    }
    if let Some(v) = src.l1_prim_size {
        dst.l1_prim_size = v;
    }
    if let Some(v) = src.framing_fault {
        dst.framing_fault = v;
    }
    if let Some(v) = src.write_queue_depth {
        dst.write_queue_depth = v;
    }
    if let Some(v) = src.read_batch {
        dst.read_batch = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    bts: BtsDto,

    #[serde(default)]
    abis: Option<AbisDto>,

    #[serde(default)]
    l1: Option<L1Dto>,

    #[serde(default)]
    shutdown: Option<ShutdownDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct BtsDto {
    #[serde(default)]
    pub bts_nr: u8,
    #[serde(default = "default_num_trx")]
    pub num_trx: u8,
    pub band: Option<GsmBand>,
    pub description: Option<String>,
    pub site_id: Option<u16>,
    pub bts_id: Option<u16>,
    pub ciphers: Option<u8>,
    pub radio_link_timeout: Option<u8>,
    pub rtp_jitter_buf_ms: Option<u32>,
    pub max_ta: Option<u8>,
    pub paging_queue_size: Option<usize>,
    pub load_ind_period: Option<u32>,
    pub dl_tch_queue_max: Option<usize>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

fn default_num_trx() -> u8 {
    1
}

#[derive(Deserialize)]
struct AbisDto {
    pub remote_host: Option<String>,
    pub remote_port: Option<u16>,
    pub model_name: Option<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct L1Dto {
    pub hw_variant: Option<HwVariant>,
    pub dev_dir: Option<String>,
    pub sys_prim_size: Option<usize>,
    pub l1_prim_size: Option<usize>,
    pub framing_fault: Option<FramingFaultPolicy>,
    pub write_queue_depth: Option<usize>,
    pub read_batch: Option<usize>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct ShutdownDto {
    pub delay_secs: Option<u64>,
    pub exit_code: Option<i32>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
