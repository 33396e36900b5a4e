pub mod api;
pub mod catalog;
pub mod core;
pub mod notify;
pub mod pricing;
pub mod scanner;
pub mod server;
pub mod store;
