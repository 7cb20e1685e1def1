//! CLI Commands

pub mod cases;
pub mod config;
pub mod run;
