//! # homesimd — homesim daemon
//!
//! Configuration and seed loading for the daemon binary, kept in a library
//! target so the end-to-end tests can reach them.

pub mod config;
pub mod seed;
