pub mod app;
pub mod config;
pub mod cors;
pub mod errors;
pub mod loadgen;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;
