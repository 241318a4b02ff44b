pub mod app;
pub mod config;
pub mod locale;
pub mod models;
pub mod providers;
pub mod services;
pub mod ui;
