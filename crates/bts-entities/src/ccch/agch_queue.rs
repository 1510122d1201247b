use std::collections::VecDeque;

use bts_core::GsmTime;
use bts_pdus::sysinfo::si3::{RSL_BCCH_CCCH_CONF_1_C, Si3RachParams, TX_INTEGER_TABLE};

use super::paging::PagingGenerator;
use crate::bts::gsm_data::{Bts, SysinfoType};

/// Size of one CCCH block
pub const MACBLOCK_LEN: usize = 23;

/// S values per tx_integer group, (separate CCCH, combined CCCH). GSM 04.08 3.3.1.1.2
const S_VALUES: [(u32, u32); 5] = [(55, 41), (76, 52), (109, 58), (163, 86), (217, 115)];

/// RACH slots per CCCH block, scaled by 256
const AGCH_RATIO_COMBINED_256: u32 = 256 / 9;
const AGCH_RATIO_SEPARATE_256: u32 = 256 * 10 / 55;

/// Maximum useful AGCH queue length for the given RACH parameters.
/// `tx_integer` is the T value (3..=50). An unknown T uses the first S group.
pub fn compute_capacity(tx_integer: u8, ccch_conf: u8) -> usize {
    let combined = ccch_conf == RSL_BCCH_CCCH_CONF_1_C;
    let group = TX_INTEGER_TABLE
        .iter()
        .position(|t| *t == tx_integer)
        .map(|idx| idx % S_VALUES.len())
        .unwrap_or(0);

    let (s_separate, s_combined) = S_VALUES[group];
    let (s, r256) = if combined {
        (s_combined, AGCH_RATIO_COMBINED_256)
    } else {
        (s_separate, AGCH_RATIO_SEPARATE_256)
    };

    ((tx_integer as u32 + 2 * s) * r256 / 256) as usize
}

/// Re-derives the AGCH capacity from the current SI3 of `bts`.
/// Returns true if the stored value changed.
pub fn update_capacity(bts: &mut Bts) -> bool {
    if !bts.si_is_valid(SysinfoType::Type3) {
        return false;
    }
    let Some(si3) = bts.si3.as_deref() else {
        return false;
    };
    let params = match Si3RachParams::from_bytes(si3) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!("bts {}: cannot parse SI3: {}", bts.nr, e);
            return false;
        }
    };

    let new_max = compute_capacity(params.tx_integer_slots(), params.ccch_conf);
    let agch = &mut bts.role.agch;
    if new_max == agch.max_length {
        return false;
    }
    agch.max_length = new_max;
    tracing::info!("Updated AGCH max queue length to {}", new_max);
    true
}

/// Access grant queue of one BTS.
/// `max_length` is advisory; enqueue never rejects.
#[derive(Debug, Default)]
pub struct AgchQueue {
    queue: VecDeque<Vec<u8>>,
    /// Number of entries, always equal to the queue length
    length: usize,
    pub max_length: usize,
    /// Messages sent on slots reserved for access grant
    pub agch_msgs: u32,
    /// Messages sent on paging slots because no paging was pending
    pub pch_msgs: u32,
}

impl AgchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, msg: Vec<u8>) {
        self.queue.push_back(msg);
        self.length += 1;
    }

    pub fn dequeue(&mut self) -> Option<Vec<u8>> {
        let msg = self.queue.pop_front()?;
        self.length -= 1;
        Some(msg)
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// True if the queue holds more than the computed capacity
    pub fn is_over_capacity(&self) -> bool {
        self.length > self.max_length
    }

    /// Returns (agch_msgs, pch_msgs) and resets both counters
    pub fn take_counters(&mut self) -> (u32, u32) {
        let counters = (self.agch_msgs, self.pch_msgs);
        self.agch_msgs = 0;
        self.pch_msgs = 0;
        counters
    }
}

/// Fills one CCCH block. Paging goes first unless the block is reserved for
/// access grant. Returns the number of bytes written, 0 if there was nothing to send.
pub fn fill_next_slot(
    agch: &mut AgchQueue,
    paging: &mut dyn PagingGenerator,
    out: &mut [u8; MACBLOCK_LEN],
    gt: GsmTime,
    is_ag_res: bool,
) -> usize {
    if !is_ag_res {
        // An empty paging message leaves the block to the AGCH queue
        if let Some(len) = paging.gen_msg(out, gt).filter(|len| *len > 0) {
            return len;
        }
    }

    let Some(msg) = agch.dequeue() else {
        return 0;
    };

    let len = msg.len().min(MACBLOCK_LEN);
    if len < msg.len() {
        tracing::warn!(gt = %gt, "AGCH message of {} bytes truncated to {}", msg.len(), len);
    }
    out[..len].copy_from_slice(&msg[..len]);

    if is_ag_res {
        agch.agch_msgs += 1;
    } else {
        agch.pch_msgs += 1;
    }
    len
}
