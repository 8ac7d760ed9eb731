//! CLI library components for the wavetab harmonization pipeline.

pub mod logging;
pub mod pipeline;
