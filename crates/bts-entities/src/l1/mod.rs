pub mod device;
pub mod l1_entity;
pub mod msg_queue;
pub mod transport;

pub use device::{DeviceOpener, L1Device, MsgqDevice, MsgqOpener};
pub use l1_entity::L1If;
pub use transport::{L1Transport, TransportError};
