//! Command-line front end for varview.

pub mod cli;
pub mod commands;
