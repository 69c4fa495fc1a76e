//! Shared test fixtures: a scripted generator model for driving scenarios
//! deterministically.

use market_simulator_core::{AtomicModel, Message, PortBags, PortSpec};
use serde_json::json;

/// Emits a fixed schedule of messages at fixed virtual times, then goes
/// quiescent. The schedule must be sorted by time.
pub struct Script {
    name: String,
    ports: &'static [PortSpec],
    schedule: Vec<(f64, &'static str, Message)>,
    index: usize,
    /// Virtual time of the last internal event.
    last_time: f64,
}

impl Script {
    pub fn new(
        name: &str,
        ports: &'static [PortSpec],
        schedule: Vec<(f64, &'static str, Message)>,
    ) -> Self {
        Self {
            name: name.to_string(),
            ports,
            schedule,
            index: 0,
            last_time: 0.0,
        }
    }
}

impl AtomicModel for Script {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_ports(&self) -> &'static [PortSpec] {
        &[]
    }

    fn output_ports(&self) -> &'static [PortSpec] {
        self.ports
    }

    fn time_advance(&self) -> f64 {
        match self.schedule.get(self.index) {
            Some((time, _, _)) => time - self.last_time,
            None => f64::INFINITY,
        }
    }

    fn output(&self, _inputs: &PortBags, outputs: &mut PortBags) {
        if let Some((_, port, message)) = self.schedule.get(self.index) {
            outputs.push(port, message.clone());
        }
    }

    fn internal_transition(&mut self) {
        if let Some((time, _, _)) = self.schedule.get(self.index) {
            self.last_time = *time;
            self.index += 1;
        }
    }

    fn external_transition(&mut self, _elapsed: f64, _inputs: &PortBags) {}

    fn state_json(&self) -> serde_json::Value {
        json!({ "index": self.index })
    }
}
