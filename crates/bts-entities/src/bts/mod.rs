pub mod bts_entity;
pub mod cipher;
pub mod gsm_data;
pub mod lifecycle;
pub mod registry;

pub use bts_entity::BtsCore;
pub use gsm_data::{Bts, BtsRole, Lchan, ManagedObject, SysinfoType, Timeslot, Trx};
pub use registry::BtsRegistry;
