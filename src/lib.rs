pub mod config;
pub mod logger;
pub mod models;
pub mod reply;
pub mod router;
pub mod ui;
