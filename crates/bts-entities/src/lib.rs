pub mod entity_trait;
pub mod fdset;
pub mod messagerouter;
pub mod timers;

pub mod abis;
pub mod bts;
pub mod ccch;
pub mod external;
pub mod l1;
pub mod model;

// Re-export commonly used items from router
pub use entity_trait::{BtsCtx, BtsEntityTrait};
pub use messagerouter::{MessagePrio, MessageQueue, MessageRouter, StackExit};
