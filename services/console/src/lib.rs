pub mod adapters;
pub mod config;
pub mod error;
pub mod poll;
pub mod stats;
pub mod ui;
