//! Matrix Terminal Library
//!
//! Core modules for the Matrix Terminal webhook chat client.

pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod session;
pub mod webhook;
