pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod paths;
pub mod session;
pub mod stream;
pub mod view;
