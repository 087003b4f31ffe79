//! Wallswitch firmware library.
//!
//! Keeps Matter OnOff attributes and physical relay/lamp outputs in sync,
//! and turns wall-switch presses into attribute toggles.  Exposes the
//! pure-logic modules for integration testing.  All ESP-IDF-specific code
//! is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod attribute;
pub mod config;
pub mod error;
pub mod events;
pub mod pins;

// Hardware-facing modules; simulation fallbacks are selected by cfg
// attributes inside.
pub mod adapters;
pub mod drivers;
