pub mod config;
pub mod logging;

pub mod account_gate;
pub mod remote;
pub mod retry;
pub mod saga;
