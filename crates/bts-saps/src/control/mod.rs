use bts_core::BtsNr;

/// Events between the BTS core and its collaborators that have no protocol SAP
#[derive(Debug, Clone)]
pub enum BtsControl {
    /// System information of a BTS was updated by the RSL layer
    NewSysinfo { bts_nr: BtsNr },
    /// Request an orderly shutdown of a BTS
    Shutdown { bts_nr: BtsNr, reason: String },
    /// Periodic CCCH load report
    CcchLoadInd {
        bts_nr: BtsNr,
        pch_msgs: u32,
        agch_msgs: u32,
        agch_queue_len: usize,
    },
}
