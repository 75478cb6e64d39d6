//! Provider Directory Core — entity schema, validation and the SQLite store.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod passwords;
