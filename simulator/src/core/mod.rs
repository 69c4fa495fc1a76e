//! Core time management for the simulation.

pub mod clock;

pub use clock::VirtualClock;
