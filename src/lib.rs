pub mod catalog;
pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod reaper;
pub mod server;
pub mod tickets;
pub mod transport;
pub mod wire;
