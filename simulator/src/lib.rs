//! Market Simulator Core - DEVS Engine
//!
//! Discrete-event simulation of an agent-based financial market, built on the
//! DEVS formalism: atomic state machines scheduled by time-advance functions,
//! composed into coupled models, and driven by a root coordinator over a
//! global virtual clock.
//!
//! # Architecture
//!
//! - **core**: Virtual clock
//! - **devs**: Generic simulation kernel (ports, atomic/coupled models, root coordinator)
//! - **models**: Domain models (TraderAgent, MatchingEngine, Regulator, ShockEvent)
//! - **events**: Event log consumed by external sinks (CSV/console)
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Virtual time is non-decreasing and advances only to the next scheduled event
//! 2. All randomness is deterministic (per-model seeded RNG)
//! 3. Transition and output functions are total; numeric domains are unchecked

// Module declarations
pub mod core;
pub mod devs;
pub mod events;
pub mod models;
pub mod rng;

// Re-exports for convenience
pub use crate::core::clock::VirtualClock;
pub use devs::{
    atomic::AtomicModel,
    coupled::{Component, CoupledModel, Endpoint},
    coordinator::{CoordinatorPhase, HaltReason, RootCoordinator, RunOutcome, SimulationError},
    message::{Message, MessageKind, Order, RegSignal, Side},
    port::{Bag, PortBags, PortSpec},
};
pub use events::{EventLog, SimEvent, TransitionKind};
pub use models::{
    market::{top_model, trading_module, MarketConfig},
    matching_engine::{EnginePhase, MatchingEngine, MatchingEngineState},
    regulator::{Regulator, RegulatorPhase, RegulatorState},
    shock::{ShockEvent, ShockEventState},
    trader::{TraderAgent, TraderAgentState},
};
pub use rng::SimRng;
