//! The atomic-model contract.
//!
//! Every leaf model is a state machine driven by four transition/output
//! functions and a time-advance function. The coordinator holds models as
//! trait objects and tracks their last-event times; a model's next-event
//! time is `last_event_time + time_advance()`.

use crate::devs::port::{PortBags, PortSpec};
use serde_json::Value;

/// Capability interface implemented by every leaf model.
///
/// Contract, per function:
///
/// - [`time_advance`](AtomicModel::time_advance): pure function of current
///   state returning sigma, the time remaining until the model's next
///   internal event. `f64::INFINITY` means quiescent.
/// - [`output`](AtomicModel::output): invoked once per cycle for every
///   imminent model, before any transition, observing the state as it stood
///   at the start of the cycle. Appends messages to output bags; never
///   mutates model state. It may read the input bags, which hold whatever
///   has already been routed this cycle from models evaluated earlier.
/// - [`internal_transition`](AtomicModel::internal_transition): the model is
///   imminent and received no input this cycle. Must leave a fresh sigma.
/// - [`external_transition`](AtomicModel::external_transition): input
///   arrived while the model was not imminent. `elapsed` is the time since
///   the model's last event; implementations age sigma by `elapsed` before
///   applying message effects.
/// - [`confluent_transition`](AtomicModel::confluent_transition): imminent
///   and receiving in the same cycle. The tie-break rule is fixed: internal
///   first, then external with zero elapsed time, so internal effects are
///   visible to (and may be overwritten by) external effects. The default
///   method encodes exactly that and models are expected to keep it.
///
/// All functions are total: no input validation, no error returns. Numeric
/// domains (inventory, liquidity, price) may go negative.
pub trait AtomicModel {
    /// Unique model identifier within the tree.
    fn name(&self) -> &str;

    /// Input port declarations.
    fn input_ports(&self) -> &'static [PortSpec];

    /// Output port declarations.
    fn output_ports(&self) -> &'static [PortSpec];

    /// Sigma: time until the next internal event, `f64::INFINITY` if none.
    fn time_advance(&self) -> f64;

    /// Emit output messages for this cycle.
    fn output(&self, inputs: &PortBags, outputs: &mut PortBags);

    /// Imminent, no input.
    fn internal_transition(&mut self);

    /// Input, not imminent.
    fn external_transition(&mut self, elapsed: f64, inputs: &PortBags);

    /// Imminent and input in the same cycle: internal then external(0).
    fn confluent_transition(&mut self, _elapsed: f64, inputs: &PortBags) {
        self.internal_transition();
        self.external_transition(0.0, inputs);
    }

    /// JSON snapshot of the model state, for the event log.
    fn state_json(&self) -> Value {
        Value::Null
    }
}
