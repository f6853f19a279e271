pub mod edge_detector;

pub use edge_detector::{ClockEdgeDetector, ClockSlot, Trigger};
