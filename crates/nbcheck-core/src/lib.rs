//! nbcheck Core Library
//!
//! Loads a Jupyter notebook, finds the cell that defines the predefined
//! speaker list, evaluates the list without executing any code, and checks
//! its shape.

pub mod check;
pub mod config;
pub mod error;
pub mod format;
pub mod literal;
pub mod locate;
pub mod logging;
pub mod notebook;
pub mod schema;
