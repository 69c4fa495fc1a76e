//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm for fast, deterministic random numbers.
//! Every randomized model owns its own seeded generator; there is no shared
//! process-wide generator state, so runs are reproducible and per-model draw
//! sequences are independent.

mod xorshift;

pub use xorshift::SimRng;
