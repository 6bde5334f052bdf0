pub mod checker;
pub mod client;
pub mod types;
