// CPU components module
pub mod am2901;
pub mod am2901_alu;

// Re-export the CPU types
pub use am2901::Am2901;
