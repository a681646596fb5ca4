//! Manas Server - HTTP API for the Manas wellness companion

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod state;
