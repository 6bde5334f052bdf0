pub mod client;
pub mod server;
pub mod service;
pub mod store;
