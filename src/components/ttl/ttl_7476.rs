//! 74x76 dual JK flip-flop with preset and clear

use log::debug;

use crate::component::{BaseComponent, Component, InstanceData};
use crate::components::clock::edge_detector::Trigger;
use crate::components::common::ttl_package::{TtlChip, TtlPackage, TtlPins};
use crate::components::memory::register_file::RegisterFile;
use crate::pin::{Bit, PinAccess};
use crate::types::Word;

// IC pin numbers as specified in the datasheet, one entry per flip-flop

// Inputs
pub const CLK: [u8; 2] = [1, 6];
pub const NPRE: [u8; 2] = [2, 7];
pub const NCLR: [u8; 2] = [3, 8];
pub const J: [u8; 2] = [4, 9];
pub const K: [u8; 2] = [16, 12];

// Outputs
pub const Q: [u8; 2] = [15, 11];
pub const NQ: [u8; 2] = [14, 10];

// Power supply
pub const VCC: u8 = 5;
pub const GND: u8 = 13;

pub static PACKAGE: TtlPackage = TtlPackage {
    pin_count: 16,
    vcc: VCC,
    gnd: GND,
    outputs: &[Q[0], NQ[0], Q[1], NQ[1]],
    port_names: &[
        "CLK1", "nPRE1", "nCLR1", "J1", "CLK2", "nPRE2", "nCLR2", "J2", "nQ2", "Q2", "K2", "nQ1",
        "Q1", "K1",
    ],
};

#[derive(Debug, Clone)]
pub struct Ttl7476 {
    base: BaseComponent,
}

impl Ttl7476 {
    pub fn new(name: String) -> Self {
        Ttl7476::with_base(BaseComponent::new(name))
    }

    pub fn with_base(base: BaseComponent) -> Self {
        Ttl7476 { base }
    }

    /// One 1-bit word per flip-flop, both cleared
    pub fn create_data() -> InstanceData {
        RegisterFile::new(1, Q.len())
    }

    fn next_state(&self, io: &TtlPins<'_>, regs: &mut RegisterFile, ff: usize) -> Bit {
        let q = regs.read(ff).get(0);
        // The slot sees every clock level, asynchronous inputs included
        let triggered = regs.update_clock(ff, io.get(CLK[ff]), Trigger::Rising);

        if io.get(NPRE[ff]) == Bit::Zero {
            return Bit::One;
        }

        if io.get(NCLR[ff]) == Bit::Zero {
            return Bit::Zero;
        }

        if !triggered {
            return q;
        }

        match (io.get(J[ff]), io.get(K[ff])) {
            (Bit::Zero, Bit::Zero) => q,
            (Bit::One, Bit::Zero) => Bit::One,
            (Bit::Zero, Bit::One) => Bit::Zero,
            (Bit::One, Bit::One) => q.not(),
            (j, k) => Self::excitation(j, k, q),
        }
    }

    /// Q+ = J·/Q + /K·Q for a J or K that is not defined. An Unknown input
    /// only reaches the state when the current Q lets it; Error always does.
    fn excitation(j: Bit, k: Bit, q: Bit) -> Bit {
        (j & !q) | (!k & q)
    }

    fn propagate_flip_flop(&self, io: &mut TtlPins<'_>, regs: &mut RegisterFile, ff: usize) {
        let next = self.next_state(io, regs, ff);

        if next != regs.read(ff).get(0) {
            debug!("{}: Q{} <- {}", self.base.name, ff + 1, next);
        }
        regs.write(ff, Word::new(vec![next]));

        if io.get(NPRE[ff]) == Bit::Zero && io.get(NCLR[ff]) == Bit::Zero {
            io.set(Q[ff], Bit::One);
            io.set(NQ[ff], Bit::One);
        } else {
            io.set(Q[ff], next);
            io.set(NQ[ff], next.not());
        }
    }
}

impl TtlChip for Ttl7476 {
    fn get_base(&self) -> &BaseComponent {
        &self.base
    }

    fn package(&self) -> &'static TtlPackage {
        &PACKAGE
    }

    fn propagate_ttl(&self, io: &mut TtlPins<'_>, data: &mut Option<InstanceData>) {
        let regs = data.get_or_insert_with(Ttl7476::create_data);

        for ff in 0..Q.len() {
            self.propagate_flip_flop(io, regs, ff);
        }
    }
}

impl Component for Ttl7476 {
    fn name(&self) -> &str {
        self.base.get_name()
    }

    fn component_type(&self) -> &'static str {
        "ttl_7476"
    }

    fn port_count(&self) -> usize {
        PACKAGE.port_count(self.base.power_pins)
    }

    fn port_named(&self, name: &str) -> Option<usize> {
        PACKAGE.port_named(name, self.base.power_pins)
    }

    fn port_name(&self, port: usize) -> Option<String> {
        PACKAGE
            .port_name(port, self.base.power_pins)
            .map(str::to_string)
    }

    fn is_output_port(&self, port: usize) -> bool {
        PACKAGE.is_output_port(port)
    }

    fn propagate(&self, pins: &mut dyn PinAccess, data: &mut Option<InstanceData>) {
        self.propagate_powered(pins, data)
    }
}
