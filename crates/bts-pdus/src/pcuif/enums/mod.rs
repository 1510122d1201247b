pub mod pcu_if_msg_type;
pub mod pcu_if_sapi;
