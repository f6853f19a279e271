//! Common functionality for chips in a dual-in-line TTL package
//!
//! Datasheets number pins from 1 and include the power pins; the host sees
//! 0-indexed ports with VCC and GND left out. This module holds the pin
//! tables, the datasheet-pin to port mapping, the optional power check and
//! bit-field access shared by the Am2901 and the 74x76.

use log::warn;

use crate::component::{BaseComponent, InstanceData};
use crate::pin::{Bit, PinAccess, PropagationDelay};
use crate::types::Word;

/// Fixed datasheet description of a package
#[derive(Debug)]
pub struct TtlPackage {
    pub pin_count: u8,
    pub vcc: u8,
    pub gnd: u8,
    /// Datasheet pins the chip drives
    pub outputs: &'static [u8],
    /// Signal pin names in port order (power pins excluded)
    pub port_names: &'static [&'static str],
}

impl TtlPackage {
    pub fn signal_port_count(&self) -> usize {
        self.pin_count as usize - 2
    }

    /// Port count as seen by the host, including VCC/GND when enabled
    pub fn port_count(&self, power_pins: bool) -> usize {
        self.signal_port_count() + if power_pins { 2 } else { 0 }
    }

    pub fn vcc_port(&self) -> usize {
        self.signal_port_count()
    }

    pub fn gnd_port(&self) -> usize {
        self.signal_port_count() + 1
    }

    /// Maps a datasheet pin number onto its port index
    pub fn port_of(&self, pin: u8) -> usize {
        let skipped = [self.vcc, self.gnd].iter().filter(|&&p| p < pin).count();
        pin as usize - 1 - skipped
    }

    pub fn is_output_port(&self, port: usize) -> bool {
        self.outputs.iter().any(|&pin| self.port_of(pin) == port)
    }

    pub fn port_named(&self, name: &str, power_pins: bool) -> Option<usize> {
        if power_pins {
            match name {
                "VCC" => return Some(self.vcc_port()),
                "GND" => return Some(self.gnd_port()),
                _ => {}
            }
        }

        self.port_names.iter().position(|&n| n == name)
    }

    pub fn port_name(&self, port: usize, power_pins: bool) -> Option<&'static str> {
        match self.port_names.get(port).copied() {
            Some(name) => Some(name),
            None if power_pins && port == self.vcc_port() => Some("VCC"),
            None if power_pins && port == self.gnd_port() => Some("GND"),
            None => None,
        }
    }
}

/// Pin access by datasheet pin number for one evaluation
pub struct TtlPins<'a> {
    package: &'static TtlPackage,
    pins: &'a mut dyn PinAccess,
    delay: PropagationDelay,
}

impl<'a> TtlPins<'a> {
    pub fn new(
        package: &'static TtlPackage,
        pins: &'a mut dyn PinAccess,
        delay: PropagationDelay,
    ) -> Self {
        TtlPins {
            package,
            pins,
            delay,
        }
    }

    /// Current value of a datasheet pin
    pub fn get(&self, pin: u8) -> Bit {
        self.pins.pin_value(self.package.port_of(pin))
    }

    /// Drives a datasheet pin
    pub fn set(&mut self, pin: u8, value: Bit) {
        let port = self.package.port_of(pin);
        self.pins.set_pin_value(port, value, self.delay);
    }

    /// Collects a group of pins into a word, first pin is bit 0
    pub fn read_field(&self, pins: &[u8]) -> Word {
        pins.iter().map(|&pin| self.get(pin)).collect()
    }

    /// Drives a group of pins from a word, first pin takes bit 0
    pub fn write_field(&mut self, pins: &[u8], value: &Word) {
        for (i, &pin) in pins.iter().enumerate() {
            self.set(pin, value.get(i));
        }
    }

    /// Drives every pin of a group with the same level
    pub fn fill_field(&mut self, pins: &[u8], value: Bit) {
        for &pin in pins {
            self.set(pin, value);
        }
    }
}

/// Shared evaluation flow for TTL-packaged chips
pub trait TtlChip {
    fn get_base(&self) -> &BaseComponent;

    fn package(&self) -> &'static TtlPackage;

    /// Chip specific logic, only called while the package is powered
    fn propagate_ttl(&self, io: &mut TtlPins<'_>, data: &mut Option<InstanceData>);

    /// Checks VCC/GND when they are exposed, then runs the chip logic.
    ///
    /// An unpowered package drives every output Unknown and keeps its state.
    fn propagate_powered(&self, pins: &mut dyn PinAccess, data: &mut Option<InstanceData>) {
        let base = self.get_base();
        let package = self.package();

        if base.power_pins && !is_powered(package, &*pins) {
            warn!("{}: VCC/GND not connected, outputs floating", base.name);
            for &pin in package.outputs {
                pins.set_pin_value(package.port_of(pin), Bit::Unknown, base.delay);
            }
            return;
        }

        let mut io = TtlPins::new(package, pins, base.delay);
        self.propagate_ttl(&mut io, data);
    }
}

/// VCC must read One and GND must read Zero
pub fn is_powered(package: &TtlPackage, pins: &dyn PinAccess) -> bool {
    pins.pin_value(package.vcc_port()) == Bit::One && pins.pin_value(package.gnd_port()) == Bit::Zero
}
