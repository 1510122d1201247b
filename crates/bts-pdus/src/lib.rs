//! Byte-exact codecs for the messages the BTS core looks into:
//! the PCU socket interface and the RACH parameters of System Information Type 3.

pub mod pcuif;
pub mod sysinfo;
