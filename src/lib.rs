/* Modules */
pub mod config;
pub mod console;
pub mod coordinator;
pub mod database;
pub mod elevator;
pub mod log_bridge;
pub mod shared;
pub mod timer;
