//! Hardware model hooks. The BTS core calls these at fixed points of the
//! lifecycle; the model answers by queueing messages for its own entities.

pub mod sysmo;

use thiserror::Error;

use crate::MessageQueue;
use crate::bts::gsm_data::{Bts, Trx};

pub use sysmo::SysmoBtsModel;

#[derive(Debug, Error)]
pub enum BtsInitError {
    #[error("BTS {0} already registered")]
    AlreadyRegistered(u8),
    #[error("model {model} failed to initialise: {reason}")]
    Model { model: String, reason: String },
}

pub trait BtsModel: Send {
    fn name(&self) -> &str;

    /// Hardware specific setup of a freshly created BTS
    fn init(&mut self, bts: &mut Bts) -> Result<(), BtsInitError>;

    /// The OML link is up and all objects have announced their state
    fn oml_estab(&mut self, queue: &mut MessageQueue, bts: &Bts);

    /// The Abis transport is gone
    fn abis_close(&mut self, queue: &mut MessageQueue, bts: &Bts);

    fn trx_deact_rf(&mut self, queue: &mut MessageQueue, trx: &Trx);

    fn trx_close(&mut self, queue: &mut MessageQueue, trx: &Trx);
}
