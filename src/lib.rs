pub mod aggregate;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod feed;
pub mod model;
pub mod status;
pub mod ui;
