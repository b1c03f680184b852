//! Commands that are not generated from a resource config

pub mod config;
pub mod raw;
