pub mod activation;
pub mod api;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod tools;
pub mod ui;

pub use error::{QuickAskError, Result};
