pub mod api;
pub mod cli;
pub mod config;
pub mod datetime;
pub mod error;
pub mod guard;
pub mod messages;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod pagination;
pub mod server;
pub mod session;
pub mod validation;
