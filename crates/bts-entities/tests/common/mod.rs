#![allow(dead_code)]

pub mod component_test;
pub mod fakes;
pub mod log_capture;
pub mod sink;

pub use component_test::{ComponentTest, default_test_config};
