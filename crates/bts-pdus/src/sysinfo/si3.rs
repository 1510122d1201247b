//! The parts of System Information Type 3 (GSM 04.08 9.1.35) that size the AGCH queue.

use bts_core::{PduParseErr, expect_value};

/// SI3 as sent on the BCCH, including the L2 pseudo length octet
pub const SI3_LEN: usize = 23;

/// Radio resource management protocol discriminator
const GSM48_PDISC_RR: u8 = 0x06;
const GSM48_MT_RR_SYSINFO_3: u8 = 0x1b;

const OFFSET_CTRL_CHAN_DESC: usize = 10;
const OFFSET_RACH_CONTROL: usize = 16;

/// CCCH configuration value for one basic physical channel combined with SDCCH
pub const RSL_BCCH_CCCH_CONF_1_C: u8 = 1;

/// Values of the RACH parameter T ("Tx-integer"), indexed by their 4-bit coding
/// (GSM 04.08 table 10.5.2.29.1)
pub const TX_INTEGER_TABLE: [u8; 16] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 16, 20, 25, 32, 50];

/// Maps the coded Tx-integer field to the number of slots T
pub fn tx_integer_from_coded(coded: u8) -> u8 {
    TX_INTEGER_TABLE[(coded & 0x0f) as usize]
}

/// RACH and CCCH parameters carried in an SI3 message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Si3RachParams {
    /// CCCH configuration from the control channel description
    pub ccch_conf: u8,
    /// Coded Tx-integer field (0..15) from the RACH control parameters
    pub tx_integer: u8,
    /// Max retransmissions (coded, 0..3)
    pub max_trans: u8,
    pub cell_barred: bool,
    pub call_reestablishment_allowed: bool,
}

impl Si3RachParams {
    pub fn from_bytes(buf: &[u8]) -> Result<Self, PduParseErr> {
        if buf.len() < SI3_LEN {
            return Err(PduParseErr::InconsistentLength {
                expected: SI3_LEN,
                found: buf.len(),
            });
        }
        let pdisc = buf[1] & 0x0f;
        expect_value!(pdisc, GSM48_PDISC_RR)?;
        let msg_type = buf[2];
        expect_value!(msg_type, GSM48_MT_RR_SYSINFO_3)?;

        let ccch_conf = buf[OFFSET_CTRL_CHAN_DESC] & 0x07;
        let rach = buf[OFFSET_RACH_CONTROL];
        Ok(Si3RachParams {
            ccch_conf,
            tx_integer: (rach >> 2) & 0x0f,
            max_trans: rach >> 6,
            cell_barred: rach & 0x02 != 0,
            // RE bit set means re-establishment is NOT allowed
            call_reestablishment_allowed: rach & 0x01 == 0,
        })
    }

    /// Number of slots T between RACH retransmissions
    pub fn tx_integer_slots(&self) -> u8 {
        tx_integer_from_coded(self.tx_integer)
    }

    pub fn is_ccch_combined(&self) -> bool {
        self.ccch_conf == RSL_BCCH_CCCH_CONF_1_C
    }
}

/// Builds a minimal SI3 carrying the given CCCH configuration and coded Tx-integer.
/// Fields not related to RACH are zero.
pub fn build_si3(ccch_conf: u8, tx_integer_coded: u8) -> [u8; SI3_LEN] {
    let mut si3 = [0u8; SI3_LEN];
    si3[0] = (18 << 2) | 0x01;
    si3[1] = GSM48_PDISC_RR;
    si3[2] = GSM48_MT_RR_SYSINFO_3;
    si3[OFFSET_CTRL_CHAN_DESC] = ccch_conf & 0x07;
    si3[OFFSET_RACH_CONTROL] = (tx_integer_coded & 0x0f) << 2;
    si3[SI3_LEN - 4..].fill(0x2b);
    si3
}
