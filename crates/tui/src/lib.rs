pub mod cli;
pub mod commands;
pub mod config;
pub mod tui;

pub use todomaster_core as core;
pub use todomaster_core::capture;
pub use todomaster_core::model;

pub use todomaster_core::ClientConfig;
