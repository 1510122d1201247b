use core::fmt;

/// Operational state of a managed object (GSM 12.21 9.4.38)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpState {
    #[default]
    Null,
    Disabled,
    Enabled,
}

/// Availability status of a managed object (GSM 12.21 9.4.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailState {
    InTest,
    Failed,
    PowerOff,
    OffLine,
    Dependency,
    Degraded,
    NotInstalled,
    Ok,
    #[default]
    NoReport,
}

impl AvailState {
    pub fn into_raw(self) -> u8 {
        match self {
            AvailState::InTest => 0,
            AvailState::Failed => 1,
            AvailState::PowerOff => 2,
            AvailState::OffLine => 3,
            AvailState::Dependency => 5,
            AvailState::Degraded => 6,
            AvailState::NotInstalled => 7,
            AvailState::Ok => 0xfe,
            AvailState::NoReport => 0xff,
        }
    }
}

/// Object classes that the BTS announces over OML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoClass {
    SiteManager,
    Bts,
    RadioCarrier,
    BasebandTransceiver,
    Channel,
    GprsNse,
    GprsCell,
    GprsNsvc,
}

impl MoClass {
    /// Object class code from GSM 12.21 9.2
    pub fn into_raw(self) -> u8 {
        match self {
            MoClass::SiteManager => 0x00,
            MoClass::Bts => 0x01,
            MoClass::RadioCarrier => 0x02,
            MoClass::BasebandTransceiver => 0x04,
            MoClass::Channel => 0x03,
            MoClass::GprsNse => 0xf0,
            MoClass::GprsCell => 0xf1,
            MoClass::GprsNsvc => 0xf2,
        }
    }
}

/// Object instance, addressed as (bts, trx, ts). Unused levels are 0xff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoInstance {
    pub bts_nr: u8,
    pub trx_nr: u8,
    pub ts_nr: u8,
}

impl MoInstance {
    pub const NONE: u8 = 0xff;

    pub fn bts(bts_nr: u8) -> Self {
        MoInstance { bts_nr, trx_nr: Self::NONE, ts_nr: Self::NONE }
    }

    pub fn trx(bts_nr: u8, trx_nr: u8) -> Self {
        MoInstance { bts_nr, trx_nr, ts_nr: Self::NONE }
    }

    pub fn ts(bts_nr: u8, trx_nr: u8, ts_nr: u8) -> Self {
        MoInstance { bts_nr, trx_nr, ts_nr }
    }
}

/// Identity of a managed object: class plus instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoId {
    pub class: MoClass,
    pub inst: MoInstance,
}

impl fmt::Display for MoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({},{},{})", self.class, self.inst.bts_nr, self.inst.trx_nr, self.inst.ts_nr)
    }
}

/// Network management state of one managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NmState {
    pub operational: OpState,
    pub availability: AvailState,
}

impl NmState {
    pub fn new(operational: OpState, availability: AvailState) -> Self {
        NmState { operational, availability }
    }
}

impl fmt::Display for NmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.operational, self.availability)
    }
}
