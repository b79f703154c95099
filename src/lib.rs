pub mod agent;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod session;
pub mod store;
pub mod tools;
pub mod ui;
