pub mod pcu_if_msg;
