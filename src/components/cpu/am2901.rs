//! Am2901 4-bit microprocessor slice
//!
//! Model based on the AMD 2900 family data book. The slice holds a 16 word
//! register file, transparent A and B latches (the A latch drives Y for the
//! RAMA destination), and the Q register. All of it lives in the instance's register file:
//! words 0..16 are the general registers, then the A latch, the B latch and Q.

use log::{debug, trace};

use crate::component::{BaseComponent, Component, InstanceData};
use crate::components::clock::edge_detector::Trigger;
use crate::components::common::ttl_package::{TtlChip, TtlPackage, TtlPins};
use crate::components::cpu::am2901_alu::{
    self, AluDestination, AluResult, Field, Microcode, REGISTER_WIDTH,
};
use crate::components::memory::register_file::RegisterFile;
use crate::pin::{Bit, PinAccess};
use crate::types::Word;

// IC pin numbers as specified in the datasheet

// Inputs
pub const A0: u8 = 4;
pub const A1: u8 = 3;
pub const A2: u8 = 2;
pub const A3: u8 = 1;

pub const B0: u8 = 17;
pub const B1: u8 = 18;
pub const B2: u8 = 19;
pub const B3: u8 = 20;

pub const D0: u8 = 25;
pub const D1: u8 = 24;
pub const D2: u8 = 23;
pub const D3: u8 = 22;

pub const C0: u8 = 29;

pub const I0: u8 = 12;
pub const I1: u8 = 13;
pub const I2: u8 = 14;
pub const I3: u8 = 26;
pub const I4: u8 = 28;
pub const I5: u8 = 27;
pub const I6: u8 = 5;
pub const I7: u8 = 7;
pub const I8: u8 = 6;

pub const OEN: u8 = 40;

pub const CLK: u8 = 15;

// Outputs
pub const PN: u8 = 35;
pub const GN: u8 = 32;
pub const C4: u8 = 33;
pub const OVR: u8 = 34;
pub const F3: u8 = 31;
pub const ZERO: u8 = 11;

pub const Y0: u8 = 36;
pub const Y1: u8 = 37;
pub const Y2: u8 = 38;
pub const Y3: u8 = 39;

// Bidirectional
pub const RAM0: u8 = 9;
pub const RAM3: u8 = 8;

pub const Q0: u8 = 21;
pub const Q3: u8 = 16;

// Power supply
pub const VCC: u8 = 10;
pub const GND: u8 = 30;

pub const A_INPUTS: [u8; 4] = [A0, A1, A2, A3];
pub const B_INPUTS: [u8; 4] = [B0, B1, B2, B3];
pub const D_INPUTS: [u8; 4] = [D0, D1, D2, D3];
pub const ALU_SRC: [u8; 3] = [I0, I1, I2];
pub const ALU_FUNC: [u8; 3] = [I3, I4, I5];
pub const ALU_DST: [u8; 3] = [I6, I7, I8];
pub const Y_OUTPUTS: [u8; 4] = [Y0, Y1, Y2, Y3];
pub const TTL_OUTPUTS: [u8; 6] = [PN, GN, C4, OVR, F3, ZERO];
pub const SHIFT_OUTPUTS: [u8; 4] = [RAM0, RAM3, Q0, Q3];

pub const NR_OF_REG: usize = 16 + 2 + 1;
pub const A_REG_IX: usize = 16;
pub const B_REG_IX: usize = 17;
pub const Q_REG_IX: usize = 18;

pub static PACKAGE: TtlPackage = TtlPackage {
    pin_count: 40,
    vcc: VCC,
    gnd: GND,
    outputs: &[
        PN, GN, C4, OVR, F3, ZERO, Y0, Y1, Y2, Y3, RAM0, RAM3, Q0, Q3,
    ],
    port_names: &[
        "A3", "A2", "A1", "A0", "I6", "I8", "I7", "RAM3", "RAM0", "F=0", "I0", "I1", "I2", "CLK",
        "Q3", "B0", "B1", "B2", "B3", "Q0", "D3", "D2", "D1", "D0", "I3", "I5", "I4", "C0", "F3",
        "Gn", "C4", "OVR", "Pn", "Y0", "Y1", "Y2", "Y3", "OEn",
    ],
};

/// Am2901 bit-slice processor element
#[derive(Debug, Clone)]
pub struct Am2901 {
    base: BaseComponent,
}

impl Am2901 {
    pub fn new(name: String) -> Self {
        Am2901::with_base(BaseComponent::new(name))
    }

    pub fn with_base(base: BaseComponent) -> Self {
        Am2901 { base }
    }

    /// Fresh instance state: all registers, latches and Q cleared
    pub fn create_data() -> InstanceData {
        RegisterFile::new(REGISTER_WIDTH, NR_OF_REG)
    }

    /// Q0/RAM0 only drive while shifting down and Q3/RAM3 only while
    /// shifting up; otherwise they are released to the bus.
    fn propagate_buffer_control(&self, io: &mut TtlPins<'_>, dest: Field<AluDestination>) {
        if let Field::Defined(dest) = dest {
            if !dest.shifts_down() {
                io.set(Q0, Bit::Unknown);
                io.set(RAM0, Bit::Unknown);
            }

            if !dest.shifts_up() {
                io.set(Q3, Bit::Unknown);
                io.set(RAM3, Bit::Unknown);
            }
        }
    }

    /// A and B latches are transparent while the clock is high
    fn propagate_latches(&self, io: &TtlPins<'_>, regs: &mut RegisterFile) {
        let clk = io.get(CLK);

        if regs.update_clock(A_REG_IX, clk, Trigger::High) {
            let value = regs.read_selected(&io.read_field(&A_INPUTS));
            regs.write(A_REG_IX, value);
        }

        if regs.update_clock(B_REG_IX, clk, Trigger::High) {
            let value = regs.read_selected(&io.read_field(&B_INPUTS));
            regs.write(B_REG_IX, value);
        }
    }

    /// Operands come straight from the addressed registers, so an undefined
    /// A or B select reaches the ALU whatever the latches hold
    fn get_alu_result(&self, io: &TtlPins<'_>, regs: &RegisterFile) -> AluResult {
        let (r, s) = am2901_alu::select_operands(
            &io.read_field(&ALU_SRC),
            &regs.read_selected(&io.read_field(&A_INPUTS)),
            &regs.read_selected(&io.read_field(&B_INPUTS)),
            &io.read_field(&D_INPUTS),
            &regs.read(Q_REG_IX),
        );

        am2901_alu::evaluate(&r, &s, io.get(C0), &io.read_field(&ALU_FUNC))
    }

    /// Q loads on the rising edge, the register file word at B while the
    /// clock is low. Nothing is stored through an undefined destination or
    /// an undefined B select.
    fn propagate_registers(
        &self,
        io: &TtlPins<'_>,
        regs: &mut RegisterFile,
        dest: Field<AluDestination>,
        f: &Word,
    ) {
        let Some(dest) = dest.defined() else {
            return;
        };
        let clk = io.get(CLK);

        if regs.update_clock(Q_REG_IX, clk, Trigger::Rising) {
            let q = regs.read(Q_REG_IX);
            let next = match dest {
                AluDestination::QReg => Some(f.clone()),
                AluDestination::RamQD => Some(q.shr(io.get(Q3))),
                AluDestination::RamQU => Some(q.shl(io.get(Q0))),
                _ => None,
            };

            if let Some(next) = next {
                debug!("{}: Q <- {}", self.base.name, next);
                regs.write(Q_REG_IX, next);
            }
        }

        let b_select = io.read_field(&B_INPUTS);

        if regs.update_selected_clock(&b_select, clk, Trigger::Low) {
            let next = match dest {
                AluDestination::RamA | AluDestination::RamF => Some(f.clone()),
                AluDestination::RamQD | AluDestination::RamD => Some(f.shr(io.get(RAM3))),
                AluDestination::RamQU | AluDestination::RamU => Some(f.shl(io.get(RAM0))),
                AluDestination::QReg | AluDestination::Nop => None,
            };

            if let Some(next) = next {
                debug!("{}: R[{}] <- {}", self.base.name, b_select, next);
                regs.write_selected(&b_select, next);
            }
        }
    }

    fn propagate_ttl_outputs(&self, io: &mut TtlPins<'_>, result: &AluResult) {
        let source = io.read_field(&ALU_SRC);
        let function = io.read_field(&ALU_FUNC);

        if source.is_error_value() || function.is_error_value() {
            io.fill_field(&TTL_OUTPUTS, Bit::Error);
            return;
        }

        if !source.is_fully_defined() || !function.is_fully_defined() {
            io.fill_field(&TTL_OUTPUTS, Bit::Unknown);
            return;
        }

        io.set(PN, result.pn);
        io.set(GN, result.gn);
        io.set(C4, result.carry_out);
        io.set(OVR, result.overflow);
        io.set(F3, result.f.get(3));
        io.set(ZERO, result.zero);
    }

    fn propagate_shift_outputs(
        &self,
        io: &mut TtlPins<'_>,
        regs: &RegisterFile,
        dest: Field<AluDestination>,
        result: &AluResult,
    ) {
        let dest = match dest {
            Field::Error => return io.fill_field(&SHIFT_OUTPUTS, Bit::Error),
            Field::Unknown => return io.fill_field(&SHIFT_OUTPUTS, Bit::Unknown),
            Field::Defined(dest) => dest,
        };
        let q = regs.read(Q_REG_IX);

        if dest.shifts_down() {
            io.set(Q0, q.get(0));
            io.set(RAM0, result.f.get(0));
        }

        if dest.shifts_up() {
            io.set(Q3, q.get(3));
            io.set(RAM3, result.f.get(3));
        }
    }

    /// OEn is active low. Y floats unless OEn is Zero, except that an
    /// undefined OEn with an undefined destination drives Unknown.
    fn propagate_y_outputs(
        &self,
        io: &mut TtlPins<'_>,
        regs: &RegisterFile,
        dest: Field<AluDestination>,
        result: &AluResult,
    ) {
        let oen = io.get(OEN);

        if oen == Bit::Error || dest.is_error() {
            io.fill_field(&Y_OUTPUTS, Bit::Error);
            return;
        }

        match (oen, dest) {
            (Bit::Unknown, Field::Unknown) => io.fill_field(&Y_OUTPUTS, Bit::Unknown),
            (Bit::Zero, Field::Defined(AluDestination::RamA)) => {
                io.write_field(&Y_OUTPUTS, &regs.read(A_REG_IX))
            }
            (Bit::Zero, _) => io.write_field(&Y_OUTPUTS, &result.f),
            _ => {}
        }
    }
}

impl TtlChip for Am2901 {
    fn get_base(&self) -> &BaseComponent {
        &self.base
    }

    fn package(&self) -> &'static TtlPackage {
        &PACKAGE
    }

    fn propagate_ttl(&self, io: &mut TtlPins<'_>, data: &mut Option<InstanceData>) {
        let regs = data.get_or_insert_with(Am2901::create_data);
        let dest = AluDestination::decode(&io.read_field(&ALU_DST));

        trace!(
            "{}: CLK={} I={}{}{} A={} B={}",
            self.base.name,
            io.get(CLK),
            io.read_field(&ALU_DST),
            io.read_field(&ALU_FUNC),
            io.read_field(&ALU_SRC),
            io.read_field(&A_INPUTS),
            io.read_field(&B_INPUTS)
        );

        self.propagate_buffer_control(io, dest);

        let result = self.get_alu_result(io, regs);

        self.propagate_latches(io, regs);
        self.propagate_registers(io, regs, dest, &result.f);
        self.propagate_ttl_outputs(io, &result);
        self.propagate_shift_outputs(io, regs, dest, &result);
        self.propagate_y_outputs(io, regs, dest, &result);
    }
}

impl Component for Am2901 {
    fn name(&self) -> &str {
        self.base.get_name()
    }

    fn component_type(&self) -> &'static str {
        "am2901"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_mapping_matches_name_table() {
        assert_eq!(PACKAGE.port_of(A3), 0);
        assert_eq!(PACKAGE.port_of(RAM0), 8);
        assert_eq!(PACKAGE.port_of(ZERO), 9);
        assert_eq!(PACKAGE.port_of(C0), 27);
        assert_eq!(PACKAGE.port_of(F3), 28);
        assert_eq!(PACKAGE.port_of(OEN), 37);
        assert_eq!(PACKAGE.port_names.len(), PACKAGE.signal_port_count());

        for (pin, name) in [(CLK, "CLK"), (Q3, "Q3"), (D0, "D0"), (I4, "I4"), (Y3, "Y3")] {
            assert_eq!(PACKAGE.port_named(name, false), Some(PACKAGE.port_of(pin)));
        }
    }

    #[test]
    fn test_port_count_with_power_pins() {
        let chip = Am2901::with_base(BaseComponent::new("U1".to_string()).with_power_pins(true));
        assert_eq!(chip.port_count(), 40);
        assert_eq!(chip.port_named("VCC"), Some(38));
        assert_eq!(Am2901::new("U2".to_string()).port_count(), 38);
    }

    #[test]
    fn test_data_created_on_first_evaluation() {
        let chip = Am2901::new("U1".to_string());
        let (_, data) = chip.evaluate(&[], None);
        let data = data.expect("state should be created");
        assert_eq!(data.count(), NR_OF_REG);
        assert_eq!(data.read(Q_REG_IX), Word::zero(4));
    }
}
