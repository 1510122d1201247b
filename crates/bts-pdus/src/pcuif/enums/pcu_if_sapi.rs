/// Logical channel a PCU DATA, RTS or RACH message refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PcuIfSapi {
    /// Channel request on CCCH
    Rach = 0x01,
    /// Assignment on CCCH
    Agch = 0x02,
    /// Paging request on CCCH
    Pch = 0x03,
    /// System information on BCCH
    Bcch = 0x04,
    /// Packet data, control or CCCH block
    Pdtch = 0x05,
    /// Packet random access channel
    Prach = 0x06,
    /// Packet timing advance control channel
    Ptcch = 0x07,
}

impl std::convert::TryFrom<u64> for PcuIfSapi {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0x01 => Ok(PcuIfSapi::Rach),
            0x02 => Ok(PcuIfSapi::Agch),
            0x03 => Ok(PcuIfSapi::Pch),
            0x04 => Ok(PcuIfSapi::Bcch),
            0x05 => Ok(PcuIfSapi::Pdtch),
            0x06 => Ok(PcuIfSapi::Prach),
            0x07 => Ok(PcuIfSapi::Ptcch),
            _ => Err(()),
        }
    }
}

impl PcuIfSapi {
    pub fn into_raw(self) -> u64 {
        self as u8 as u64
    }
}

impl From<PcuIfSapi> for u64 {
    fn from(e: PcuIfSapi) -> Self {
        e.into_raw()
    }
}
