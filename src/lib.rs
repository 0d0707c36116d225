pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod rest;
pub mod server;
pub mod storage;

pub use config::ServerConfig;
pub use server::Server;
