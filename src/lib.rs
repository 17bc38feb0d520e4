pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod export;
pub mod logging;
pub mod state;
pub mod summary;
