//! # homesim-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository` — where devices live between commands
//!   - `EventPublisher` — fan-out of domain events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `CommandService` — apply commands now, schedule them, read enriched states
//!   - `ScheduleService` — tick the clock, view and cancel schedules
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (event bus, in-memory home)
//! - Emit `tracing` events for applied, scheduled, fired and failed commands
//!
//! ## Dependency rule
//! Depends on `homesim-domain` only (plus `tokio::sync` for channels).

pub mod event_bus;
pub mod home;
pub mod ports;
pub mod services;
