//! Matching engine: applies orders to the market price, absorbs shocks, and
//! obeys regulatory halt/resume signals.

use crate::devs::atomic::AtomicModel;
use crate::devs::message::{Message, MessageKind, Order, RegSignal, Side};
use crate::devs::port::{PortBags, PortSpec};
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Liquidity drained by a shock event, regardless of its magnitude.
const SHOCK_LIQUIDITY_DRAIN: i64 = 200;

/// Whether the market is accepting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnginePhase {
    Running,
    Halted,
}

/// Matching engine state.
///
/// `liquidity` is unchecked and may go negative; that is a property of the
/// market model, not a defect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingEngineState {
    pub liquidity: i64,
    pub last_trade_price: f64,
    pub halted: bool,
    pub sigma: f64,
    pub phase: EnginePhase,
}

impl Default for MatchingEngineState {
    fn default() -> Self {
        Self {
            liquidity: 1000,
            last_trade_price: 50.0,
            halted: false,
            // Periodic market update every second.
            sigma: 1.0,
            phase: EnginePhase::Running,
        }
    }
}

const INPUT_PORTS: [PortSpec; 3] = [
    PortSpec::new("order_in", MessageKind::Order),
    PortSpec::new("reg_signal_in", MessageKind::Signal),
    PortSpec::new("shock_in", MessageKind::Price),
];
const OUTPUT_PORTS: [PortSpec; 2] = [
    PortSpec::new("execution_out", MessageKind::Order),
    PortSpec::new("market_update_out", MessageKind::Price),
];

/// The matching engine.
///
/// Price impact of an order is random (per-engine seeded generator): a sell
/// moves the price by a uniform draw in [-6, -1), a buy by a draw in
/// [0, 3) plus 0.5. A shock is added to the price directly and preempts any
/// order received in the same cycle.
pub struct MatchingEngine {
    name: String,
    state: MatchingEngineState,
    rng: SimRng,
}

impl MatchingEngine {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self::with_state(name, MatchingEngineState::default(), seed)
    }

    pub fn with_state(name: impl Into<String>, state: MatchingEngineState, seed: u64) -> Self {
        Self {
            name: name.into(),
            state,
            rng: SimRng::new(seed),
        }
    }

    pub fn state(&self) -> &MatchingEngineState {
        &self.state
    }
}

impl AtomicModel for MatchingEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_ports(&self) -> &'static [PortSpec] {
        &INPUT_PORTS
    }

    fn output_ports(&self) -> &'static [PortSpec] {
        &OUTPUT_PORTS
    }

    fn time_advance(&self) -> f64 {
        self.state.sigma
    }

    /// Execution reports observe the pre-transition price: an order seen in
    /// this cycle's input bag is priced at the `last_trade_price` as it
    /// stood when the cycle began, even if a simultaneous shock is about to
    /// move it.
    fn output(&self, inputs: &PortBags, outputs: &mut PortBags) {
        if self.state.phase == EnginePhase::Running {
            if let Some(order) = inputs.latest("order_in").and_then(Message::as_order) {
                let execution = Order::new(order.side, order.quantity, self.state.last_trade_price);
                outputs.push("execution_out", Message::Order(execution));
            }
        }
        // Always send out the market update.
        outputs.push(
            "market_update_out",
            Message::Price(self.state.last_trade_price),
        );
    }

    fn internal_transition(&mut self) {
        // Heartbeat: periodic update every second.
        self.state.sigma = 1.0;
    }

    fn external_transition(&mut self, elapsed: f64, inputs: &PortBags) {
        self.state.sigma -= elapsed;

        if let Some(signal) = inputs.latest("reg_signal_in").and_then(Message::as_signal) {
            match signal {
                RegSignal::Halt => {
                    self.state.halted = true;
                    self.state.phase = EnginePhase::Halted;
                }
                RegSignal::Resume => {
                    self.state.halted = false;
                    self.state.phase = EnginePhase::Running;
                }
            }
        }

        if let Some(shock) = inputs.latest("shock_in").and_then(Message::as_price) {
            self.state.last_trade_price += shock;
            self.state.liquidity -= SHOCK_LIQUIDITY_DRAIN;
            // React immediately; any order in the same cycle is dropped.
            self.state.sigma = 0.0;
            return;
        }

        if self.state.phase == EnginePhase::Running {
            if let Some(order) = inputs.latest("order_in").and_then(Message::as_order).copied() {
                let fluctuation = match order.side {
                    Side::Sell => self.rng.uniform(-6.0, -1.0),
                    Side::Buy => self.rng.uniform(0.0, 3.0) + 0.5,
                };
                self.state.last_trade_price += fluctuation;
                self.state.liquidity -= order.quantity;
                self.state.sigma = 0.0;
            }
        }
    }

    fn state_json(&self) -> Value {
        serde_json::to_value(&self.state).unwrap_or(Value::Null)
    }
}
