use bts_core::TrxNr;

/// Logical signalling link kinds carried over one Abis transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignLinkKind {
    Oml,
    Rsl { trx_nr: TrxNr },
}

/// OML frame received from the BSC
#[derive(Debug, Clone)]
pub struct AbisOmlDataInd {
    pub data: Vec<u8>,
}

/// OML frame to be sent to the BSC
#[derive(Debug, Clone)]
pub struct AbisOmlDataReq {
    pub data: Vec<u8>,
}

/// RSL frame received from the BSC for one TRX
#[derive(Debug, Clone)]
pub struct AbisRslDataInd {
    pub trx_nr: TrxNr,
    pub data: Vec<u8>,
}

/// RSL frame to be sent to the BSC on the link of one TRX
#[derive(Debug, Clone)]
pub struct AbisRslDataReq {
    pub trx_nr: TrxNr,
    pub data: Vec<u8>,
}

/// Asks the RSL handler to report the radio resource state of a TRX
#[derive(Debug, Clone)]
pub struct RslRfResourceReq {
    pub trx_nr: TrxNr,
}
