//! Compute module - Field sampling, color mapping and particle advection.

mod axes;
mod engine;
mod field;
mod ramp;
mod stats;
mod trail;

pub use axes::*;
pub use engine::*;
pub use field::*;
pub use ramp::*;
pub use stats::*;
pub use trail::*;
