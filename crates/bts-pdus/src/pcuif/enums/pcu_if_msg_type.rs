/// PCU interface message types (first octet of every message)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PcuIfMsgType {
    /// Send data to given channel
    DataReq = 0x00,
    /// Receive data from given channel
    DataInd = 0x02,
    /// Ready to send data to given channel
    RtsReq = 0x10,
    /// Receive RACH
    RachInd = 0x22,
    /// Retrieve BTS info
    InfoInd = 0x32,
    /// Activate or deactivate a PDCH
    ActReq = 0x40,
    /// GSM time indication
    TimeInd = 0x52,
}

impl std::convert::TryFrom<u64> for PcuIfMsgType {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0x00 => Ok(PcuIfMsgType::DataReq),
            0x02 => Ok(PcuIfMsgType::DataInd),
            0x10 => Ok(PcuIfMsgType::RtsReq),
            0x22 => Ok(PcuIfMsgType::RachInd),
            0x32 => Ok(PcuIfMsgType::InfoInd),
            0x40 => Ok(PcuIfMsgType::ActReq),
            0x52 => Ok(PcuIfMsgType::TimeInd),
            _ => Err(()),
        }
    }
}

impl PcuIfMsgType {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        self as u8 as u64
    }
}

impl From<PcuIfMsgType> for u64 {
    fn from(e: PcuIfMsgType) -> Self {
        e.into_raw()
    }
}

impl core::fmt::Display for PcuIfMsgType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PcuIfMsgType::DataReq => write!(f, "DATA_REQ"),
            PcuIfMsgType::DataInd => write!(f, "DATA_IND"),
            PcuIfMsgType::RtsReq => write!(f, "RTS_REQ"),
            PcuIfMsgType::RachInd => write!(f, "RACH_IND"),
            PcuIfMsgType::InfoInd => write!(f, "INFO_IND"),
            PcuIfMsgType::ActReq => write!(f, "ACT_REQ"),
            PcuIfMsgType::TimeInd => write!(f, "TIME_IND"),
        }
    }
}
