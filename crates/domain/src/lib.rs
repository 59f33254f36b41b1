//! # homesim-domain
//!
//! Pure engine for simulated smart-home devices.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (named states, traits, declared toggles and modes)
//! - Define **Commands** (closed catalogue, value shapes, registry, dispatcher, rules)
//! - Define **Schedules** (trigger-time math, deferred entries, tick, reverts)
//! - Define **Events** (records of applied, failed and scheduled commands)
//! - Temperature unit conversion
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO or logging.
//! Schedule math and `tick` take `now` as an argument instead of reading the clock.

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod device;
pub mod event;
pub mod schedule;
pub mod unit;
