//! Configuration Module
//!
//! Configuration loading for the streaming client.

mod settings;

pub use settings::{ConfigError, EndpointSettings, PollSettings, PushSettings, StreamConfig};
