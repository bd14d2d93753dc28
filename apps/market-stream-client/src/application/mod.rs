//! Application Layer - Ports and the streaming client service.
//!
//! This layer defines the transport contracts the domain is served
//! through and the client that orchestrates them.

/// Port interfaces for the push and poll transports.
pub mod ports;

/// The streaming market client and its reconnect policy.
pub mod client;
