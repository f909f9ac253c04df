pub mod config;
pub mod mine;
pub mod sweep;
pub mod worker;
