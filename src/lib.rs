pub mod api;
pub mod app;
pub mod config;
pub mod email;
pub mod report;
pub mod scheduler;
pub mod services;
pub mod storage;
pub mod utils;
