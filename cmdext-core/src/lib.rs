// src/lib.rs

pub mod db;
pub mod repositories;
pub mod runtime;
pub mod services;
pub mod api;
pub mod web;
pub mod settings;
pub mod extension;

pub use db::Database;
pub use cmdext_common::error::Error;
pub use extension::{CommandsExtension, EXTENSION_NAME};
