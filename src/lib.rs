//! Importforged - post-import enrichment for media libraries
//!
//! This library crate exposes the core functionality for integration testing.

pub mod bazarr;
pub mod config;
pub mod import;
pub mod jellyfin;
pub mod processor;
pub mod retry;
pub mod subtitles;
