//! Trading agent: emits one random order per heartbeat.

use crate::devs::atomic::AtomicModel;
use crate::devs::message::{Message, MessageKind, Order, Side};
use crate::devs::port::{PortBags, PortSpec};
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;

/// Base price attached to every submitted order.
const BASE_PRICE: f64 = 50.0;

/// Trader state: inventory plus the time until the next order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderAgentState {
    pub inventory: f64,
    pub sigma: f64,
}

impl Default for TraderAgentState {
    fn default() -> Self {
        Self {
            inventory: 0.0,
            sigma: 1.0,
        }
    }
}

const INPUT_PORTS: [PortSpec; 2] = [
    PortSpec::new("market_info", MessageKind::Price),
    PortSpec::new("reg_signal", MessageKind::Signal),
];
const OUTPUT_PORTS: [PortSpec; 1] = [PortSpec::new("order_out", MessageKind::Order)];

/// A trading agent that submits one order per time unit: random side
/// (50/50), random quantity in [50, 200], fixed base price.
///
/// Regulatory halt/resume signals and market updates are received but do
/// not change behavior - the agent keeps trading while the market is
/// halted. Suppression of executions during a halt is the matching
/// engine's job.
pub struct TraderAgent {
    name: String,
    state: TraderAgentState,
    // Drawing a side/quantity advances the generator, not the trading
    // state, so output() stays a &self side-effect-only function.
    rng: RefCell<SimRng>,
}

impl TraderAgent {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self::with_state(name, TraderAgentState::default(), seed)
    }

    pub fn with_state(name: impl Into<String>, state: TraderAgentState, seed: u64) -> Self {
        Self {
            name: name.into(),
            state,
            rng: RefCell::new(SimRng::new(seed)),
        }
    }

    pub fn state(&self) -> &TraderAgentState {
        &self.state
    }
}

impl AtomicModel for TraderAgent {
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

    fn output(&self, _inputs: &PortBags, outputs: &mut PortBags) {
        let mut rng = self.rng.borrow_mut();
        let side = if rng.next_f64() < 0.5 {
            Side::Buy
        } else {
            Side::Sell
        };
        let quantity = rng.int_range(50, 200);
        outputs.push(
            "order_out",
            Message::Order(Order::new(side, quantity, BASE_PRICE)),
        );
    }

    fn internal_transition(&mut self) {
        // Schedule the next order; execution feedback updates inventory
        // elsewhere, not here.
        self.state.sigma = 1.0;
    }

    fn external_transition(&mut self, elapsed: f64, inputs: &PortBags) {
        self.state.sigma -= elapsed;
        // Halt/resume and market updates are observed but deliberately
        // ignored.
        let _ = inputs.latest("reg_signal").and_then(Message::as_signal);
        let _ = inputs.latest("market_info").and_then(Message::as_price);
    }

    fn state_json(&self) -> Value {
        serde_json::to_value(&self.state).unwrap_or(Value::Null)
    }
}
