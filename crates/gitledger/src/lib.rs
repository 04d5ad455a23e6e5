//! gitledger library
//!
//! This module exports the command-line configuration and subcommand
//! execution for use in integration tests.

pub mod commands;
pub mod config;
