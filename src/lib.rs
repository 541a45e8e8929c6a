pub mod config;
pub mod provider;
pub mod scanner;
pub mod signal;
pub mod types;
