//! Clock trigger evaluation for clocked storage.
//!
//! Every independently clocked location keeps the last level it saw on its
//! clock input. Edge triggers compare that level with the current one; level
//! triggers only look at the current level.

use serde::{Deserialize, Serialize};

use crate::pin::Bit;

/// When a clocked location accepts new data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Rising,  // Zero -> One
    Falling, // One -> Zero
    High,    // Transparent while One
    Low,     // Transparent while Zero
}

/// Previous clock level of one storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockSlot {
    previous: Bit,
}

impl ClockSlot {
    pub fn new() -> Self {
        ClockSlot {
            previous: Bit::Unknown,
        }
    }

    pub fn previous(&self) -> Bit {
        self.previous
    }

    /// Returns whether `trigger` fires for `current`, then remembers `current`.
    ///
    /// Transitions through Unknown or Error never count as edges.
    pub fn update(&mut self, current: Bit, trigger: Trigger) -> bool {
        let fired = match trigger {
            Trigger::Rising => self.previous == Bit::Zero && current == Bit::One,
            Trigger::Falling => self.previous == Bit::One && current == Bit::Zero,
            Trigger::High => current == Bit::One,
            Trigger::Low => current == Bit::Zero,
        };

        self.previous = current;
        fired
    }
}

/// A fixed set of clock slots, one per clocked location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockEdgeDetector {
    slots: Vec<ClockSlot>,
}

impl ClockEdgeDetector {
    pub fn new(slot_count: usize) -> Self {
        ClockEdgeDetector {
            slots: vec![ClockSlot::new(); slot_count],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn previous(&self, slot: usize) -> Option<Bit> {
        self.slots.get(slot).map(ClockSlot::previous)
    }

    /// Out-of-range slots never fire
    pub fn update(&mut self, slot: usize, current: Bit, trigger: Trigger) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => s.update(current, trigger),
            None => false,
        }
    }
}
