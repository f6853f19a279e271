//! Indexed word storage with one clock slot per word.
//!
//! This is the per-instance state of every clocked chip in the crate. The
//! Am2901 keeps its 16 general registers plus the A latch, B latch and Q
//! register here; the 74x76 keeps its two flip-flop states as 1-bit words.

use log::debug;

use crate::components::clock::edge_detector::{ClockEdgeDetector, Trigger};
use crate::pin::Bit;
use crate::types::Word;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    width: usize,
    words: Vec<Word>,
    clocks: ClockEdgeDetector,
}

impl RegisterFile {
    /// Creates `count` all-zero words of `width` bits
    pub fn new(width: usize, count: usize) -> Self {
        RegisterFile {
            width,
            words: vec![Word::zero(width); count],
            clocks: ClockEdgeDetector::new(count),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn count(&self) -> usize {
        self.words.len()
    }

    /// Word at `index`, or an Unknown word when the index is out of range
    pub fn read(&self, index: usize) -> Word {
        self.words
            .get(index)
            .cloned()
            .unwrap_or_else(|| Word::unknown(self.width))
    }

    /// Reads the word chosen by a selector taken straight from the pins.
    ///
    /// A selector with an Error bit reads as an Error word, one with an
    /// Unknown bit (or out of range) as an Unknown word.
    pub fn read_selected(&self, selector: &Word) -> Word {
        match (selector.fault(), selector.to_u64()) {
            (Some(Bit::Error), _) => Word::error(self.width),
            (_, Some(index)) => self.read(index as usize),
            _ => Word::unknown(self.width),
        }
    }

    /// Replaces the word at `index`; out-of-range writes are dropped
    pub fn write(&mut self, index: usize, value: Word) {
        debug_assert_eq!(value.width(), self.width, "register width mismatch");

        match self.words.get_mut(index) {
            Some(slot) => *slot = value,
            None => debug!("dropping write to register {} of {}", index, self.count()),
        }
    }

    /// Writes through a pin selector; a selector that is not fully defined
    /// leaves storage untouched
    pub fn write_selected(&mut self, selector: &Word, value: Word) {
        match selector.to_u64() {
            Some(index) => self.write(index as usize, value),
            None => debug!("ignoring register write through selector {}", selector),
        }
    }

    /// Feeds `level` to the clock slot of word `slot` and reports whether it fired
    pub fn update_clock(&mut self, slot: usize, level: Bit, trigger: Trigger) -> bool {
        self.clocks.update(slot, level, trigger)
    }

    /// Clock slot lookup through a pin selector; an undefined selector
    /// never fires and leaves every slot untouched
    pub fn update_selected_clock(&mut self, selector: &Word, level: Bit, trigger: Trigger) -> bool {
        match selector.to_u64() {
            Some(index) => self.update_clock(index as usize, level, trigger),
            None => false,
        }
    }

    pub fn clocks(&self) -> &ClockEdgeDetector {
        &self.clocks
    }
}
