//! Shared domain — cross-cutting ресурсы
//!
//! Содержит то, что используется несколькими доменами:
//! - Logical clock (SimulationTick, ClockPlugin)

pub mod clock;

pub use clock::*;
