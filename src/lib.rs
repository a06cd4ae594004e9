pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod source;
