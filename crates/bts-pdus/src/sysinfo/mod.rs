pub mod si3;
