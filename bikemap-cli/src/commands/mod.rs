//! CLI command implementations.

pub mod common;
pub mod config;
pub mod notice;
pub mod run;
pub mod stations;
