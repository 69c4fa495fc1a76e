//! Exogenous shock generator: a one-shot event that jolts the market.

use crate::devs::atomic::AtomicModel;
use crate::devs::message::{Message, MessageKind};
use crate::devs::port::{PortBags, PortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When the shock fires, relative to simulation start.
const SHOCK_TIME: f64 = 30.0;

/// Fixed price shock applied to the market.
const SHOCK_MAGNITUDE: f64 = -10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockEventState {
    pub sigma: f64,
    pub event_occurred: bool,
}

impl Default for ShockEventState {
    fn default() -> Self {
        Self {
            sigma: SHOCK_TIME,
            event_occurred: false,
        }
    }
}

const OUTPUT_PORTS: [PortSpec; 1] = [PortSpec::new("shock_out", MessageKind::Price)];

/// One-shot generator: emits a fixed `-10.0` shock at t = 30, then becomes
/// permanently quiescent (sigma = infinity).
pub struct ShockEvent {
    name: String,
    state: ShockEventState,
}

impl ShockEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_state(name, ShockEventState::default())
    }

    pub fn with_state(name: impl Into<String>, state: ShockEventState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    pub fn state(&self) -> &ShockEventState {
        &self.state
    }
}

impl AtomicModel for ShockEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_ports(&self) -> &'static [PortSpec] {
        &[]
    }

    fn output_ports(&self) -> &'static [PortSpec] {
        &OUTPUT_PORTS
    }

    fn time_advance(&self) -> f64 {
        self.state.sigma
    }

    fn output(&self, _inputs: &PortBags, outputs: &mut PortBags) {
        if !self.state.event_occurred {
            outputs.push("shock_out", Message::Price(SHOCK_MAGNITUDE));
        }
    }

    fn internal_transition(&mut self) {
        self.state.event_occurred = true;
        // No further events.
        self.state.sigma = f64::INFINITY;
    }

    fn external_transition(&mut self, elapsed: f64, _inputs: &PortBags) {
        self.state.sigma -= elapsed;
    }

    fn state_json(&self) -> Value {
        serde_json::to_value(&self.state).unwrap_or(Value::Null)
    }
}
