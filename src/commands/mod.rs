//! CLI commands for nbcheck

pub mod check;
pub mod dispatch;
pub mod format;
pub mod speakers;
