pub mod catalog;
pub mod config;
pub mod entitlements;
pub mod error;
pub mod formatter;
pub mod models;
pub mod quota;
pub mod summary;
pub mod window;
