/// Custom definitions for stack control
pub mod control;

pub mod abis;
pub mod l1;
pub mod nm;
pub mod sapmsg;

pub use sapmsg::*;
