//! Command-line interface, built behind the `cli` feature.

pub mod app;
pub mod chunks;
pub mod convert;
pub mod dump;
pub mod info;
