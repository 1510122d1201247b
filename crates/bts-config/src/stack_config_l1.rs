use serde::Deserialize;

/// Hardware generation of the DSP message queue interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HwVariant {
    /// System and L1 queues only
    V1,
    /// System, L1 signalling, TCH and PDTCH queues
    V2,
}

/// What to do when a primitive of the wrong size arrives from the DSP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FramingFaultPolicy {
    /// Log at fatal severity and drop the primitive
    Log,
    /// Log at fatal severity and abort the process
    Abort,
}

/// Size of the DSP system primitive (SuperFemto_Prim_t)
pub const DEFAULT_SYS_PRIM_SIZE: usize = 540;
/// Size of the DSP L1 primitive (GsmL1_Prim_t)
pub const DEFAULT_L1_PRIM_SIZE: usize = 700;

/// L1 message queue configuration
#[derive(Debug, Clone)]
pub struct CfgL1 {
    pub hw_variant: HwVariant,
    /// Directory holding the msgq device nodes
    pub dev_dir: String,
    /// Exact size of every primitive on the system queue
    pub sys_prim_size: usize,
    /// Exact size of every primitive on the L1, TCH and PDTCH queues
    pub l1_prim_size: usize,
    pub framing_fault: FramingFaultPolicy,
    /// Pending primitives per write queue
    pub write_queue_depth: usize,
    /// Primitives read per readiness notification
    pub read_batch: usize,
}

impl Default for CfgL1 {
    fn default() -> Self {
        Self {
            hw_variant: HwVariant::V2,
            dev_dir: "/dev/msgq".to_string(),
            sys_prim_size: DEFAULT_SYS_PRIM_SIZE,
            l1_prim_size: DEFAULT_L1_PRIM_SIZE,
            framing_fault: FramingFaultPolicy::Abort,
            write_queue_depth: 10,
            read_batch: 3,
        }
    }
}

impl CfgL1 {
    /// Read buffer size: the largest primitive plus some headroom,
    /// so an oversized primitive is detected rather than truncated.
    pub fn read_buf_size(&self) -> usize {
        self.sys_prim_size.max(self.l1_prim_size) + 128
    }
}
