//! Market topology: wires the four models into the two-level tree.
//!
//! ```text
//!            MarketImpactTopModel
//!  +--------------------------------------+
//!  |  TradingMatchingModule               |
//!  |  +--------------------------------+  |
//!  |  | TraderAgent --> MatchingEngine |  |    market_feed
//!  |  |      ^   ^        |   ^        |--|------------------> Regulator
//!  |  |      |   +--------+   |        |  |                       |
//!  |  |      |  market update |        |  |    reg_control        |
//!  |  |      +---- ShockEvent-+        |<-|-----------------------+
//!  |  +--------------------------------+  |
//!  +--------------------------------------+
//! ```
//!
//! The regulator's signal feeds back through the trading module's boundary
//! input to both the trader and the engine, closing the halt/resume loop.
//! The engine's `execution_out` port is deliberately left uncoupled; its
//! emissions are visible only in the event log.

use crate::devs::coordinator::SimulationError;
use crate::devs::coupled::{Component, CoupledModel, Endpoint};
use crate::devs::message::MessageKind;
use crate::devs::port::PortSpec;
use crate::models::matching_engine::MatchingEngine;
use crate::models::regulator::Regulator;
use crate::models::shock::ShockEvent;
use crate::models::trader::TraderAgent;

/// Seeds for the randomized models. One generator per model keeps runs
/// reproducible and draw sequences independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketConfig {
    pub trader_seed: u64,
    pub engine_seed: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            trader_seed: 12345,
            engine_seed: 67890,
        }
    }
}

/// The trading module: trader, matching engine and shock generator, with a
/// regulatory boundary input and a market-feed boundary output.
pub fn trading_module(config: &MarketConfig) -> Result<CoupledModel, SimulationError> {
    let mut module = CoupledModel::new("TradingMatchingModule");
    module.add_in_port(PortSpec::new("reg_control", MessageKind::Signal));
    module.add_out_port(PortSpec::new("market_feed", MessageKind::Price));

    module.add_component(Component::atomic(TraderAgent::new(
        "TraderAgent",
        config.trader_seed,
    )))?;
    module.add_component(Component::atomic(MatchingEngine::new(
        "MatchingEngine",
        config.engine_seed,
    )))?;
    module.add_component(Component::atomic(ShockEvent::new("ShockEvent")))?;

    module.add_coupling(
        Endpoint::Child("TraderAgent", "order_out"),
        Endpoint::Child("MatchingEngine", "order_in"),
    )?;
    module.add_coupling(
        Endpoint::Child("MatchingEngine", "market_update_out"),
        Endpoint::Child("TraderAgent", "market_info"),
    )?;
    module.add_coupling(
        Endpoint::Child("ShockEvent", "shock_out"),
        Endpoint::Child("MatchingEngine", "shock_in"),
    )?;

    // Regulatory input fans out to both trader and engine.
    module.add_coupling(
        Endpoint::Boundary("reg_control"),
        Endpoint::Child("TraderAgent", "reg_signal"),
    )?;
    module.add_coupling(
        Endpoint::Boundary("reg_control"),
        Endpoint::Child("MatchingEngine", "reg_signal_in"),
    )?;
    module.add_coupling(
        Endpoint::Child("MatchingEngine", "market_update_out"),
        Endpoint::Boundary("market_feed"),
    )?;

    Ok(module)
}

/// The top-level model: trading module plus regulator, with the feedback
/// loop between them.
pub fn top_model(config: &MarketConfig) -> Result<CoupledModel, SimulationError> {
    let mut top = CoupledModel::new("MarketImpactTopModel");

    top.add_component(trading_module(config)?)?;
    top.add_component(Component::atomic(Regulator::new("Regulator")))?;

    top.add_coupling(
        Endpoint::Child("TradingMatchingModule", "market_feed"),
        Endpoint::Child("Regulator", "market_update_in"),
    )?;
    top.add_coupling(
        Endpoint::Child("Regulator", "reg_signal_out"),
        Endpoint::Child("TradingMatchingModule", "reg_control"),
    )?;

    Ok(top)
}
