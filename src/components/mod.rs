//! Chip models and the building blocks they share
pub mod clock;
pub mod common;
pub mod cpu;
pub mod memory;
pub mod pld;
pub mod ttl;
