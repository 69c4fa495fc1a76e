//! Regulator: watches market updates and halts trading on a sharp drop.

use crate::devs::atomic::AtomicModel;
use crate::devs::message::{Message, MessageKind, RegSignal};
use crate::devs::port::{PortBags, PortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Price drop (old minus new) that triggers a trading halt.
const DROP_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegulatorPhase {
    Monitoring,
    HaltingPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatorState {
    pub last_price: f64,
    pub halt_active: bool,
    /// How long a halt lasts once the halt signal is out.
    pub halt_duration: f64,
    /// Whether the halt signal has been emitted for the current period.
    pub halt_signal_sent: bool,
    pub sigma: f64,
    pub phase: RegulatorPhase,
}

impl Default for RegulatorState {
    fn default() -> Self {
        Self {
            last_price: 50.0,
            halt_active: false,
            halt_duration: 5.0,
            halt_signal_sent: false,
            // Check every second.
            sigma: 1.0,
            phase: RegulatorPhase::Monitoring,
        }
    }
}

const INPUT_PORTS: [PortSpec; 1] = [PortSpec::new("market_update_in", MessageKind::Price)];
const OUTPUT_PORTS: [PortSpec; 1] = [PortSpec::new("reg_signal_out", MessageKind::Signal)];

/// The regulatory monitor.
///
/// In `Monitoring`, a market update whose price sits `DROP_THRESHOLD` or
/// more below the previously observed price flips the regulator into
/// `HaltingPeriod` with an immediate event: the next `output` emits `Halt`,
/// and `halt_duration` later a second event emits `Resume` and returns to
/// `Monitoring`.
pub struct Regulator {
    name: String,
    state: RegulatorState,
}

impl Regulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_state(name, RegulatorState::default())
    }

    pub fn with_state(name: impl Into<String>, state: RegulatorState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    pub fn state(&self) -> &RegulatorState {
        &self.state
    }
}

impl AtomicModel for Regulator {
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
        if self.state.phase == RegulatorPhase::HaltingPeriod {
            let signal = if self.state.halt_signal_sent {
                RegSignal::Resume
            } else {
                RegSignal::Halt
            };
            outputs.push("reg_signal_out", Message::Signal(signal));
        }
    }

    fn internal_transition(&mut self) {
        if self.state.phase == RegulatorPhase::HaltingPeriod {
            if !self.state.halt_signal_sent {
                // Halt just went out; schedule the resume.
                self.state.halt_signal_sent = true;
                self.state.sigma = self.state.halt_duration;
            } else {
                // Resume just went out; back to watching.
                self.state.phase = RegulatorPhase::Monitoring;
                self.state.halt_active = false;
                self.state.halt_signal_sent = false;
                self.state.sigma = 1.0;
            }
        } else {
            self.state.sigma = 1.0;
        }
    }

    fn external_transition(&mut self, elapsed: f64, inputs: &PortBags) {
        self.state.sigma -= elapsed;
        if let Some(new_price) = inputs.latest("market_update_in").and_then(Message::as_price) {
            if self.state.phase == RegulatorPhase::Monitoring
                && (self.state.last_price - new_price) >= DROP_THRESHOLD
            {
                self.state.phase = RegulatorPhase::HaltingPeriod;
                self.state.sigma = 0.0;
                self.state.halt_active = true;
            }
            self.state.last_price = new_price;
        }
    }

    fn state_json(&self) -> Value {
        serde_json::to_value(&self.state).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(price: f64) -> PortBags {
        let mut inputs = PortBags::for_ports(&INPUT_PORTS);
        inputs.push("market_update_in", Message::Price(price));
        inputs
    }

    #[test]
    fn test_small_drop_keeps_monitoring() {
        let mut reg = Regulator::new("Regulator");
        reg.external_transition(1.0, &update(49.5));
        assert_eq!(reg.state().phase, RegulatorPhase::Monitoring);
        assert_eq!(reg.state().last_price, 49.5);
        assert!(!reg.state().halt_active);
    }

    #[test]
    fn test_sharp_drop_triggers_halting_period() {
        let mut reg = Regulator::new("Regulator");
        reg.external_transition(1.0, &update(48.0));
        assert_eq!(reg.state().phase, RegulatorPhase::HaltingPeriod);
        assert_eq!(reg.state().sigma, 0.0);
        assert!(reg.state().halt_active);
        assert_eq!(reg.state().last_price, 48.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut reg = Regulator::new("Regulator");
        reg.external_transition(1.0, &update(49.0)); // exactly 1.0 below
        assert_eq!(reg.state().phase, RegulatorPhase::HaltingPeriod);
    }

    #[test]
    fn test_no_trigger_while_halting() {
        let mut state = RegulatorState::default();
        state.phase = RegulatorPhase::HaltingPeriod;
        state.halt_signal_sent = true;
        state.sigma = 5.0;
        let mut reg = Regulator::with_state("Regulator", state);

        reg.external_transition(1.0, &update(30.0));
        // Price tracked, but the running halt period is not restarted.
        assert_eq!(reg.state().last_price, 30.0);
        assert_eq!(reg.state().sigma, 4.0);
        assert!(reg.state().halt_signal_sent);
    }

    #[test]
    fn test_halt_then_resume_sequence() {
        let mut reg = Regulator::new("Regulator");
        reg.external_transition(1.0, &update(48.0));

        // Imminent now: output emits Halt, internal schedules the resume.
        let inputs = PortBags::for_ports(reg.input_ports());
        let mut outputs = PortBags::for_ports(reg.output_ports());
        reg.output(&inputs, &mut outputs);
        assert_eq!(
            outputs.latest("reg_signal_out"),
            Some(&Message::Signal(RegSignal::Halt))
        );

        reg.internal_transition();
        assert!(reg.state().halt_signal_sent);
        assert_eq!(reg.state().sigma, 5.0);

        // Five time units later: Resume goes out, back to Monitoring.
        let mut outputs = PortBags::for_ports(reg.output_ports());
        reg.output(&inputs, &mut outputs);
        assert_eq!(
            outputs.latest("reg_signal_out"),
            Some(&Message::Signal(RegSignal::Resume))
        );

        reg.internal_transition();
        assert_eq!(reg.state().phase, RegulatorPhase::Monitoring);
        assert!(!reg.state().halt_active);
        assert!(!reg.state().halt_signal_sent);
        assert_eq!(reg.state().sigma, 1.0);
    }

    #[test]
    fn test_monitoring_heartbeat_emits_nothing() {
        let mut reg = Regulator::new("Regulator");
        let inputs = PortBags::for_ports(reg.input_ports());
        let mut outputs = PortBags::for_ports(reg.output_ports());
        reg.output(&inputs, &mut outputs);
        assert!(outputs.bag("reg_signal_out").unwrap().is_empty());

        reg.internal_transition();
        assert_eq!(reg.state().sigma, 1.0);
    }
}
