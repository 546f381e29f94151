pub mod app;
pub mod config;
pub mod types;
pub mod view;
