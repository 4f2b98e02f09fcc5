//! REST-side entry point for the Nimbus SDK.
//!
//! Holds the endpoint/project configuration and the generic `call`
//! convention every resource service rides on. The realtime crate
//! consumes this configuration (endpoint, project id, session slot)
//! but never the HTTP transport itself.

pub mod config;
pub mod http;

pub use config::ClientConfig;
pub use http::{Body, Client};
