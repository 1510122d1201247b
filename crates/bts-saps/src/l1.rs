use core::fmt;

use bts_core::TrxNr;

/// Message queues towards the DSP. Tch and Pdtch only exist on V2 hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum L1Queue {
    /// System control (SuperFemto primitives)
    Sys,
    /// L1 signalling (GsmL1 primitives)
    L1,
    /// Traffic channel data
    Tch,
    /// Packet data channel data
    Pdtch,
}

impl L1Queue {
    pub const ALL: [L1Queue; 4] = [L1Queue::Sys, L1Queue::L1, L1Queue::Tch, L1Queue::Pdtch];

    pub fn index(self) -> usize {
        match self {
            L1Queue::Sys => 0,
            L1Queue::L1 => 1,
            L1Queue::Tch => 2,
            L1Queue::Pdtch => 3,
        }
    }
}

impl fmt::Display for L1Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            L1Queue::Sys => write!(f, "SYS"),
            L1Queue::L1 => write!(f, "L1"),
            L1Queue::Tch => write!(f, "TCH"),
            L1Queue::Pdtch => write!(f, "PDTCH"),
        }
    }
}

/// Which primitive union a queue carries. Fixed per queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L1PrimKind {
    /// SuperFemto_Prim_t
    System,
    /// GsmL1_Prim_t
    GsmL1,
}

impl L1Queue {
    pub fn prim_kind(self) -> L1PrimKind {
        match self {
            L1Queue::Sys => L1PrimKind::System,
            L1Queue::L1 | L1Queue::Tch | L1Queue::Pdtch => L1PrimKind::GsmL1,
        }
    }
}

/// One correctly framed primitive read from a DSP queue
#[derive(Debug, Clone)]
pub struct L1PrimInd {
    pub queue: L1Queue,
    pub kind: L1PrimKind,
    pub data: Vec<u8>,
}

/// A primitive to be written to a DSP queue
#[derive(Debug, Clone)]
pub struct L1PrimReq {
    pub queue: L1Queue,
    pub data: Vec<u8>,
}

/// Management of the DSP queues and the radio front end
#[derive(Debug, Clone)]
pub enum L1Control {
    /// Open the read and write endpoints of a queue
    Open(L1Queue),
    /// Close a queue; closing a closed queue is harmless
    Close(L1Queue),
    /// Switch the RF front end of a TRX on or off
    ActivateRf { trx_nr: TrxNr, on: bool },
}
