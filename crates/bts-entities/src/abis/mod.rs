pub mod abis_entity;
pub mod ipa;
pub mod ipa_worker;
pub mod sign_link;

pub use abis_entity::AbisBs;
pub use ipa_worker::{AbisCommand, AbisEvent};
pub use sign_link::{AbisError, SignLink, sign_link_dispatch, sign_link_down, sign_link_up};
