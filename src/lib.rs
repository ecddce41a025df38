pub use todomaster_tui::cli;
pub use todomaster_tui::commands;
pub use todomaster_tui::config;
pub use todomaster_tui::tui;
pub use todomaster_tui::ClientConfig;

pub use todomaster_core as core;
pub use todomaster_core::capture;
pub use todomaster_core::model;
