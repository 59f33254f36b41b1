//! Commands — the closed catalogue, its value shapes, and the dispatcher.
//!
//! Raw string arguments are parsed into a typed [`Value`] exactly once, at
//! [`dispatch`], before any rule touches device state.

mod dispatch;
mod name;
mod registry;
mod rules;
mod shape;

pub use dispatch::{apply, dispatch};
pub use name::CommandName;
pub use registry::{spec, CommandSpec, Effect, RuleFn};
pub use shape::{FanSpeed, LightEffect, Value, ValueShape, TEMPERATURE_UNIT_TOKENS};
pub use rules::{INPUTS, LIGHT_EFFECT_MODE};
