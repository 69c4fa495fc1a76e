//! Domain models: the market behaviors exercising the DEVS kernel.

pub mod market;
pub mod matching_engine;
pub mod regulator;
pub mod shock;
pub mod trader;

pub use market::{top_model, trading_module, MarketConfig};
pub use matching_engine::{EnginePhase, MatchingEngine, MatchingEngineState};
pub use regulator::{Regulator, RegulatorPhase, RegulatorState};
pub use shock::{ShockEvent, ShockEventState};
pub use trader::{TraderAgent, TraderAgentState};
