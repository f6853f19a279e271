use crate::pin::Bit;
use std::fmt;

/// Fixed-width word of 4-valued bits, index 0 is the least significant bit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    bits: Vec<Bit>,
}

impl Word {
    pub fn new(bits: Vec<Bit>) -> Self {
        Word { bits }
    }

    pub fn filled(width: usize, bit: Bit) -> Self {
        Word {
            bits: vec![bit; width],
        }
    }

    /// Builds a fully defined word, keeping only the low `width` bits of `value`
    pub fn known(width: usize, value: u64) -> Self {
        (0..width)
            .map(|i| Bit::from_bool(i < 64 && (value >> i) & 1 == 1))
            .collect()
    }

    pub fn zero(width: usize) -> Self {
        Word::filled(width, Bit::Zero)
    }

    pub fn unknown(width: usize) -> Self {
        Word::filled(width, Bit::Unknown)
    }

    pub fn error(width: usize) -> Self {
        Word::filled(width, Bit::Error)
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Bit at `index`; reading past the width yields Unknown
    pub fn get(&self, index: usize) -> Bit {
        self.bits.get(index).copied().unwrap_or(Bit::Unknown)
    }

    pub fn set(&mut self, index: usize, bit: Bit) {
        if let Some(slot) = self.bits.get_mut(index) {
            *slot = bit;
        }
    }

    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    pub fn is_fully_defined(&self) -> bool {
        self.bits.iter().all(Bit::is_defined)
    }

    /// True when any bit is in conflict
    pub fn is_error_value(&self) -> bool {
        self.bits.contains(&Bit::Error)
    }

    /// Integer value of a fully defined word, `None` otherwise
    pub fn to_u64(&self) -> Option<u64> {
        if self.width() > 64 {
            return None;
        }

        self.bits
            .iter()
            .enumerate()
            .try_fold(0u64, |acc, (i, bit)| match bit {
                Bit::Zero => Some(acc),
                Bit::One => Some(acc | (1u64 << i)),
                Bit::Unknown | Bit::Error => None,
            })
    }

    /// Collapses a partly defined word to its dominant fault: Error before Unknown
    pub fn fault(&self) -> Option<Bit> {
        if self.is_error_value() {
            Some(Bit::Error)
        } else if !self.is_fully_defined() {
            Some(Bit::Unknown)
        } else {
            None
        }
    }

    pub fn not(&self) -> Word {
        self.bits.iter().map(|b| b.not()).collect()
    }

    pub fn and(&self, other: &Word) -> Word {
        self.zip_with(other, Bit::and)
    }

    pub fn or(&self, other: &Word) -> Word {
        self.zip_with(other, Bit::or)
    }

    pub fn xor(&self, other: &Word) -> Word {
        self.zip_with(other, Bit::xor)
    }

    /// Shift toward the MSB; `shift_in` lands in bit 0 and the MSB falls off
    pub fn shl(&self, shift_in: Bit) -> Word {
        if self.bits.is_empty() {
            return self.clone();
        }

        std::iter::once(shift_in)
            .chain(self.bits[..self.width() - 1].iter().copied())
            .collect()
    }

    /// Shift toward the LSB; `shift_in` lands in the MSB and bit 0 falls off
    pub fn shr(&self, shift_in: Bit) -> Word {
        if self.bits.is_empty() {
            return self.clone();
        }

        self.bits[1..]
            .iter()
            .copied()
            .chain(std::iter::once(shift_in))
            .collect()
    }

    fn zip_with(&self, other: &Word, op: fn(Bit, Bit) -> Bit) -> Word {
        debug_assert_eq!(self.width(), other.width(), "word width mismatch");
        self.bits
            .iter()
            .zip(other.bits.iter())
            .map(|(a, b)| op(*a, *b))
            .collect()
    }
}

impl FromIterator<Bit> for Word {
    fn from_iter<I: IntoIterator<Item = Bit>>(iter: I) -> Self {
        Word {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().rev() {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_masks_to_width() {
        let w = Word::known(4, 0x1A);
        assert_eq!(w.to_u64(), Some(0xA));
        assert_eq!(w.to_string(), "1010");
    }

    #[test]
    fn test_to_u64_rejects_undefined() {
        let mut w = Word::known(4, 3);
        w.set(2, Bit::Unknown);
        assert_eq!(w.to_u64(), None);
        assert_eq!(w.fault(), Some(Bit::Unknown));

        w.set(0, Bit::Error);
        assert_eq!(w.fault(), Some(Bit::Error));
    }

    #[test]
    fn test_shifts() {
        let w = Word::known(4, 0b1001);
        assert_eq!(w.shl(Bit::Zero), Word::known(4, 0b0010));
        assert_eq!(w.shl(Bit::One), Word::known(4, 0b0011));
        assert_eq!(w.shr(Bit::Zero), Word::known(4, 0b0100));
        assert_eq!(w.shr(Bit::One), Word::known(4, 0b1100));
        assert_eq!(w.shr(Bit::Unknown).to_string(), "x100");
    }

    #[test]
    fn test_bitwise_words() {
        let a = Word::known(4, 0b1100);
        let b = Word::known(4, 0b1010);
        assert_eq!(a.and(&b), Word::known(4, 0b1000));
        assert_eq!(a.or(&b), Word::known(4, 0b1110));
        assert_eq!(a.xor(&b), Word::known(4, 0b0110));
        assert_eq!(a.not(), Word::known(4, 0b0011));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Word::unknown(4), Word::unknown(4));
        assert_ne!(Word::unknown(4), Word::error(4));
        assert_ne!(Word::known(3, 0), Word::known(4, 0));
    }
}
