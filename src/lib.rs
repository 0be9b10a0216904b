pub mod config;
pub mod error;
pub mod i18n;
pub mod processor;
pub mod provider;
pub mod server;
pub mod store;
pub mod translation;
