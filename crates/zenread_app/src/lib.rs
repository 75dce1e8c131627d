//! ZenRead application layer: configuration, the HTTP service and the
//! terminal reader built on the core state machine and the engine.
pub mod config;
pub mod platform;
pub mod server;

pub use config::{AppConfig, ConfigError};
pub use platform::app::{list_voices, run_reader, ReadOptions, ReaderError};
pub use platform::logging::LogDestination;
pub use server::{router, serve, ApiError, ParseResponse};
