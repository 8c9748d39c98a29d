// src/ring/mod.rs
pub mod accumulation;
pub mod pre_roll;

pub use accumulation::AccumulationBuffer;
pub use pre_roll::{PreMotionBuffer, RingStats};
