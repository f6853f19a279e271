//! # Rusty Chips Library
//!
//! Pin-level models of the Am2901 4-bit bit-slice processor, the 74x76 dual
//! JK flip-flop and a GAL22V10-style programmable logic array, evaluated in a
//! 4-valued logic (0, 1, Unknown, Error).
//!
//! A surrounding schematic simulator owns the nets and the per-instance
//! state. Once per settling iteration it hands each chip the resolved pin
//! levels through [`pin::PinAccess`] together with the instance's
//! [`component::InstanceData`]; the chip updates that state and drives its
//! outputs. The crate also carries a JSON component factory and a
//! test-vector bench runner in [`system_config`].

pub mod component;
pub mod components;
pub mod error;
pub mod pin;
pub mod system_config;
pub mod types;

// Re-export commonly used items for easier importing
pub use component::{BaseComponent, Chip, Component, InstanceData};
pub use error::{ConfigError, FuseMapError};
pub use pin::{Bit, PinAccess, PinFrame};
pub use types::Word;
