use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single 4-valued logic level as seen on a resolved net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Bit {
    Zero,
    One,
    #[default]
    Unknown, // Undriven or not yet settled
    Error,   // Two drivers disagree
}

impl Bit {
    pub fn to_char(&self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
            Bit::Unknown => 'x',
            Bit::Error => 'E',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            'x' | 'X' | 'U' | 'Z' | 'z' => Some(Bit::Unknown),
            'E' | 'e' => Some(Bit::Error),
            _ => None,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Bit::Zero => Some(false),
            Bit::One => Some(true),
            Bit::Unknown | Bit::Error => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Bit::Zero | Bit::One)
    }

    pub fn not(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
            other => other,
        }
    }

    /// Error wins, then a definite Zero, then Unknown.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Bit::Error, _) | (_, Bit::Error) => Bit::Error,
            (Bit::Zero, _) | (_, Bit::Zero) => Bit::Zero,
            (Bit::Unknown, _) | (_, Bit::Unknown) => Bit::Unknown,
            (Bit::One, Bit::One) => Bit::One,
        }
    }

    /// Error wins, then a definite One, then Unknown.
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Bit::Error, _) | (_, Bit::Error) => Bit::Error,
            (Bit::One, _) | (_, Bit::One) => Bit::One,
            (Bit::Unknown, _) | (_, Bit::Unknown) => Bit::Unknown,
            (Bit::Zero, Bit::Zero) => Bit::Zero,
        }
    }

    pub fn xor(self, other: Self) -> Self {
        match (self, other) {
            (Bit::Error, _) | (_, Bit::Error) => Bit::Error,
            (Bit::Unknown, _) | (_, Bit::Unknown) => Bit::Unknown,
            (a, b) => Bit::from_bool(a != b),
        }
    }
}

impl Not for Bit {
    type Output = Bit;

    fn not(self) -> Bit {
        Bit::not(self)
    }
}

impl BitAnd for Bit {
    type Output = Bit;

    fn bitand(self, rhs: Bit) -> Bit {
        self.and(rhs)
    }
}

impl BitOr for Bit {
    type Output = Bit;

    fn bitor(self, rhs: Bit) -> Bit {
        self.or(rhs)
    }
}

impl BitXor for Bit {
    type Output = Bit;

    fn bitxor(self, rhs: Bit) -> Bit {
        self.xor(rhs)
    }
}

/// Opaque scheduling hint handed back to the host with every pin write.
pub type PropagationDelay = u32;

/// Port-level boundary to the surrounding simulator.
///
/// Values read here are already resolved by the host's net-merge logic;
/// components never see individual drivers.
pub trait PinAccess {
    fn pin_value(&self, port: usize) -> Bit;
    fn set_pin_value(&mut self, port: usize, value: Bit, delay: PropagationDelay);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinDrive {
    pub value: Bit,
    pub delay: PropagationDelay,
}

/// Resolved inputs for one evaluation plus whatever the component drove.
///
/// Ports that were never written stay undriven (`None`), which is how a
/// tri-stated output looks to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinFrame {
    inputs: Vec<Bit>,
    drives: Vec<Option<PinDrive>>,
}

impl PinFrame {
    pub fn new(port_count: usize) -> Self {
        PinFrame {
            inputs: vec![Bit::Unknown; port_count],
            drives: vec![None; port_count],
        }
    }

    pub fn from_inputs(inputs: &[Bit]) -> Self {
        PinFrame {
            inputs: inputs.to_vec(),
            drives: vec![None; inputs.len()],
        }
    }

    pub fn port_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn set_input(&mut self, port: usize, value: Bit) {
        if let Some(slot) = self.inputs.get_mut(port) {
            *slot = value;
        }
    }

    pub fn drive(&self, port: usize) -> Option<PinDrive> {
        self.drives.get(port).copied().flatten()
    }

    /// Value driven onto `port` during the last evaluation, if any.
    pub fn driven(&self, port: usize) -> Option<Bit> {
        self.drive(port).map(|d| d.value)
    }

    pub fn drives(&self) -> &[Option<PinDrive>] {
        &self.drives
    }

    pub fn clear_drives(&mut self) {
        self.drives.iter_mut().for_each(|d| *d = None);
    }
}

impl PinAccess for PinFrame {
    fn pin_value(&self, port: usize) -> Bit {
        self.inputs.get(port).copied().unwrap_or(Bit::Unknown)
    }

    fn set_pin_value(&mut self, port: usize, value: Bit, delay: PropagationDelay) {
        if let Some(slot) = self.drives.get_mut(port) {
            *slot = Some(PinDrive { value, delay });
        }
    }
}

impl std::fmt::Display for Bit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl std::fmt::Display for PinFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (port, input) in self.inputs.iter().enumerate() {
            match self.driven(port) {
                Some(out) => write!(f, "{}>{}", input, out)?,
                None => write!(f, "{}", input)?,
            }
            if port + 1 < self.inputs.len() {
                write!(f, " ")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Bit; 4] = [Bit::Zero, Bit::One, Bit::Unknown, Bit::Error];

    #[test]
    fn test_not_table() {
        assert_eq!(!Bit::Zero, Bit::One);
        assert_eq!(!Bit::One, Bit::Zero);
        assert_eq!(!Bit::Unknown, Bit::Unknown);
        assert_eq!(!Bit::Error, Bit::Error);
    }

    #[test]
    fn test_and_zero_dominates_unknown() {
        assert_eq!(Bit::Zero & Bit::Unknown, Bit::Zero);
        assert_eq!(Bit::One & Bit::Unknown, Bit::Unknown);
        assert_eq!(Bit::Zero & Bit::Error, Bit::Error);
        assert_eq!(Bit::One & Bit::One, Bit::One);
    }

    #[test]
    fn test_or_one_dominates_unknown() {
        assert_eq!(Bit::One | Bit::Unknown, Bit::One);
        assert_eq!(Bit::Zero | Bit::Unknown, Bit::Unknown);
        assert_eq!(Bit::One | Bit::Error, Bit::Error);
        assert_eq!(Bit::Zero | Bit::Zero, Bit::Zero);
    }

    #[test]
    fn test_xor_table() {
        assert_eq!(Bit::One ^ Bit::Zero, Bit::One);
        assert_eq!(Bit::One ^ Bit::One, Bit::Zero);
        assert_eq!(Bit::One ^ Bit::Unknown, Bit::Unknown);
        assert_eq!(Bit::Unknown ^ Bit::Error, Bit::Error);
    }

    #[test]
    fn test_operators_commute() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a & b, b & a);
                assert_eq!(a | b, b | a);
                assert_eq!(a ^ b, b ^ a);
            }
        }
    }

    #[test]
    fn test_char_round_trip() {
        for bit in ALL {
            assert_eq!(Bit::from_char(bit.to_char()), Some(bit));
        }
        assert_eq!(Bit::from_char('q'), None);
    }

    #[test]
    fn test_frame_reads_unknown_out_of_range() {
        let frame = PinFrame::from_inputs(&[Bit::One]);
        assert_eq!(frame.pin_value(0), Bit::One);
        assert_eq!(frame.pin_value(7), Bit::Unknown);
    }

    #[test]
    fn test_frame_records_drives() {
        let mut frame = PinFrame::new(3);
        frame.set_pin_value(1, Bit::Zero, 4);
        assert_eq!(frame.driven(0), None);
        assert_eq!(
            frame.drive(1),
            Some(PinDrive {
                value: Bit::Zero,
                delay: 4
            })
        );

        // Writes past the end are dropped
        frame.set_pin_value(9, Bit::One, 1);
        assert_eq!(frame.drives().len(), 3);

        frame.clear_drives();
        assert_eq!(frame.driven(1), None);
    }
}
