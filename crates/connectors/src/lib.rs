//! Azure DevOps tables over the generic list engine.

pub mod client;
pub mod config;
pub mod error;
pub mod plugin;
pub mod resources;
pub mod tables;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::DevOpsClient;
pub use config::ConnectionConfig;
pub use plugin::Plugin;
