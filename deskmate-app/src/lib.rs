//! Deskmate command-line application: configuration, logging and wiring.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod logging;
