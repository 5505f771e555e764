//! Karma Bot - configuration and the event dispatcher.

pub mod config;
pub mod dispatcher;

pub use config::Config;
pub use dispatcher::{DispatchError, DispatchStats, Dispatcher, Outcome};
