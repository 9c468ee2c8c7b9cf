mod call_tracker;
mod client;
mod client_config;

pub use client::Client;
pub use client_config::ClientConfig;
