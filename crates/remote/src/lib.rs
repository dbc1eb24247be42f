// Remote access for the tree administration tools
// This crate talks to the REST backend that stores trees, nodes and prefixes

mod client;
mod config;
mod error;

pub use client::HttpGateway;
pub use config::RemoteConfig;
pub use error::RemoteError;
