//! Core utilities for the GSM BTS control process
//!
//! This crate provides fundamental types used across the stack:
//! - GsmTime for frame number arithmetic
//! - GSM band and network management (NM) state types
//! - Entity and SAP identifiers used by the message router
//! - Logging setup and common macros

pub mod band;
pub mod bts_common;
pub mod bts_entities;
pub mod debug;
pub mod gsm_time;
pub mod nm_state;
pub mod pdu_parse_error;

// Re-export commonly used items
pub use band::GsmBand;
pub use bts_common::*;
pub use gsm_time::GsmTime;
pub use nm_state::*;
pub use pdu_parse_error::PduParseErr;

/// Number of a BTS within the process-wide registry
pub type BtsNr = u8;

/// Number of a TRX within its BTS
pub type TrxNr = u8;

/// Number of timeslots on one TRX
pub const TRX_NUM_TS: usize = 8;

/// Maximum number of logical channels on one timeslot
pub const TS_MAX_LCHAN: usize = 8;
