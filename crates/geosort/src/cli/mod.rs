//! Command handlers for the geosort CLI.

pub mod config;
pub mod sort;
