//! Infrastructure: external API clients and configuration loading.

pub mod ai;
pub mod config;
