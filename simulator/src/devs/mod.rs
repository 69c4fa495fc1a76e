//! Generic DEVS simulation kernel.
//!
//! The kernel is independent of the market domain: typed ports with
//! per-cycle message bags, the atomic-model contract, coupled-model
//! composition, and the root coordinator that drives global virtual time.
//!
//! Dependency order (leaves first): port → atomic → coupled → coordinator.

pub mod atomic;
pub mod coordinator;
pub mod coupled;
pub mod message;
pub mod port;

pub use atomic::AtomicModel;
pub use coordinator::{CoordinatorPhase, HaltReason, RootCoordinator, RunOutcome, SimulationError};
pub use coupled::{Component, CoupledModel, Endpoint};
pub use message::{Message, MessageKind, Order, RegSignal, Side};
pub use port::{Bag, PortBags, PortSpec};
