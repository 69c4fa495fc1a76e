//! Root coordinator - drives global virtual time over the model tree.
//!
//! At construction the model tree is flattened depth-first into an indexed
//! list of atomic models and every coupling is resolved, through coupled
//! boundary ports, into direct atomic-to-atomic routes. Runtime cost per
//! cycle is then a fixed lookup.
//!
//! # Cycle protocol
//!
//! For each cycle at global time `t`:
//! 1. imminent set = every atomic model whose next-event time equals `t`
//! 2. for each imminent model, in depth-first construction order: invoke
//!    `output` and route the produced messages immediately. A model's
//!    `output` therefore observes input bags already filled by models
//!    earlier in the order - this interleaving is part of the contract (the
//!    matching engine prices executions from same-cycle orders).
//! 3. for every model that is imminent or has input, apply exactly one
//!    transition: confluent (both), internal (imminent only) or external
//!    (input only)
//! 4. advance the clock to `t`
//! 5. clear every port bag
//!
//! All routing completes before any transition runs, so no model's
//! transition in a cycle observes another's post-transition state.

use crate::core::clock::VirtualClock;
use crate::devs::atomic::AtomicModel;
use crate::devs::coupled::{Component, CoupledModel, Endpoint};
use crate::devs::message::{Message, MessageKind};
use crate::devs::port::PortBags;
use crate::events::{EventLog, SimEvent, TransitionKind};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

/// Lifecycle state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    Idle,
    Initialized,
    Running,
    Terminated,
}

impl fmt::Display for CoordinatorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorPhase::Idle => write!(f, "Idle"),
            CoordinatorPhase::Initialized => write!(f, "Initialized"),
            CoordinatorPhase::Running => write!(f, "Running"),
            CoordinatorPhase::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Errors raised at construction and lifecycle boundaries.
///
/// Transition and output functions themselves are total and never fail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("unknown component '{component}' in coupled model '{model}'")]
    UnknownComponent { model: String, component: String },

    #[error("unknown port '{port}' in coupled model '{model}'")]
    UnknownPort { model: String, port: String },

    #[error("duplicate component '{component}' in coupled model '{model}'")]
    DuplicateComponent { model: String, component: String },

    #[error("coupling {from} -> {to} mixes message kinds: {source_kind} vs {dest_kind}")]
    CouplingTypeMismatch {
        from: String,
        to: String,
        source_kind: MessageKind,
        dest_kind: MessageKind,
    },

    #[error("operation requires coordinator phase {expected}, current phase is {actual}")]
    InvalidPhase {
        expected: CoordinatorPhase,
        actual: CoordinatorPhase,
    },
}

/// Why a `simulate` call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The next event would fall at or beyond the requested bound.
    DurationReached,
    /// Every model reached sigma = infinity; nothing will ever fire again.
    Quiescent,
}

/// Summary of a `simulate` run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    pub halt: HaltReason,
    /// Number of cycles executed by this call.
    pub cycles: usize,
    /// Virtual time after the last executed cycle.
    pub final_time: f64,
}

/// Port-graph node used during one-time coupling resolution.
type PortNode = (usize, &'static str, PortDir);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PortDir {
    In,
    Out,
}

/// Bookkeeping for one flattened atomic model.
struct ModelSlot {
    /// Component id in the pre-flattening tree (route resolution only).
    comp_id: usize,
    model: Box<dyn AtomicModel>,
    /// Time of this model's last transition.
    last_event: f64,
    inputs: PortBags,
    outputs: PortBags,
}

impl ModelSlot {
    fn next_event_time(&self) -> f64 {
        self.last_event + self.model.time_advance()
    }
}

/// The root coordinator: owns the flattened tree, the virtual clock, the
/// resolved routes and the event log.
pub struct RootCoordinator {
    slots: Vec<ModelSlot>,
    /// (source slot, output port) -> destinations (dest slot, input port).
    routes: HashMap<(usize, &'static str), Vec<(usize, &'static str)>>,
    clock: VirtualClock,
    phase: CoordinatorPhase,
    event_log: EventLog,
}

impl RootCoordinator {
    /// Flatten the tree and resolve all couplings. The tree is never
    /// mutated afterwards.
    pub fn new(top: CoupledModel) -> Result<Self, SimulationError> {
        let mut slots = Vec::new();
        let mut atomic_slot = HashMap::new();
        let mut edges: HashMap<PortNode, Vec<PortNode>> = HashMap::new();
        let mut next_id = 1;
        flatten(top, 0, &mut next_id, &mut slots, &mut atomic_slot, &mut edges)?;

        let routes = resolve_routes(&slots, &atomic_slot, &edges);

        Ok(Self {
            slots,
            routes,
            clock: VirtualClock::new(),
            phase: CoordinatorPhase::Idle,
            event_log: EventLog::new(),
        })
    }

    /// Reset every atomic model's event bookkeeping and enter `Running`.
    ///
    /// Covers both legs of Idle -> Initialized -> Running: models already
    /// carry their initial state from construction, so initialization is the
    /// clock/bag reset plus the initial sigma read in the first cycle.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        if self.phase != CoordinatorPhase::Idle {
            return Err(SimulationError::InvalidPhase {
                expected: CoordinatorPhase::Idle,
                actual: self.phase,
            });
        }
        self.phase = CoordinatorPhase::Initialized;
        self.clock.reset();
        for slot in &mut self.slots {
            slot.last_event = 0.0;
            slot.inputs.clear();
            slot.outputs.clear();
        }
        self.phase = CoordinatorPhase::Running;
        Ok(())
    }

    /// Run cycles for `duration` units of virtual time from the current
    /// clock.
    ///
    /// Stops when the next event would fall at or beyond the bound (an
    /// event scheduled exactly at the bound does not run), or earlier when
    /// the whole tree is quiescent. Quiescence is an ordinary termination
    /// path, reported in the outcome.
    pub fn simulate(&mut self, duration: f64) -> Result<RunOutcome, SimulationError> {
        if self.phase != CoordinatorPhase::Running {
            return Err(SimulationError::InvalidPhase {
                expected: CoordinatorPhase::Running,
                actual: self.phase,
            });
        }
        let end = self.clock.now() + duration;
        let mut cycles = 0;
        loop {
            let next = self.next_event_time();
            if !next.is_finite() {
                return Ok(RunOutcome {
                    halt: HaltReason::Quiescent,
                    cycles,
                    final_time: self.clock.now(),
                });
            }
            if next >= end {
                return Ok(RunOutcome {
                    halt: HaltReason::DurationReached,
                    cycles,
                    final_time: self.clock.now(),
                });
            }
            self.cycle(next);
            cycles += 1;
        }
    }

    /// Run a single cycle. Returns the event time of the executed cycle, or
    /// `None` if the tree is quiescent.
    pub fn step(&mut self) -> Result<Option<f64>, SimulationError> {
        if self.phase != CoordinatorPhase::Running {
            return Err(SimulationError::InvalidPhase {
                expected: CoordinatorPhase::Running,
                actual: self.phase,
            });
        }
        let next = self.next_event_time();
        if !next.is_finite() {
            return Ok(None);
        }
        self.cycle(next);
        Ok(Some(next))
    }

    /// Enter `Terminated`; no further cycles are permitted.
    pub fn stop(&mut self) {
        self.phase = CoordinatorPhase::Terminated;
    }

    /// Next global event time: the minimum next-event time over all models.
    pub fn next_event_time(&self) -> f64 {
        self.slots
            .iter()
            .map(ModelSlot::next_event_time)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    /// Current virtual time.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// The full event log recorded so far.
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Names of the flattened atomic models, in evaluation order.
    pub fn model_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.model.name()).collect()
    }

    /// JSON snapshot of a model's current state.
    pub fn model_state(&self, name: &str) -> Option<serde_json::Value> {
        self.slots
            .iter()
            .find(|s| s.model.name() == name)
            .map(|s| s.model.state_json())
    }

    /// Execute one cycle at global time `time`.
    fn cycle(&mut self, time: f64) {
        let n = self.slots.len();
        let mut imminent = vec![false; n];
        for (i, slot) in self.slots.iter().enumerate() {
            imminent[i] = slot.next_event_time() == time;
        }

        // Output + routing, interleaved per model in construction order.
        for i in 0..n {
            if !imminent[i] {
                continue;
            }
            let slot = &mut self.slots[i];
            slot.model.output(&slot.inputs, &mut slot.outputs);
            let source = slot.model.name().to_string();
            let emitted: Vec<(&'static str, Message)> = slot
                .outputs
                .iter()
                .flat_map(|(spec, bag)| {
                    let port = spec.name;
                    bag.messages().iter().map(move |msg| (port, msg.clone()))
                })
                .collect();
            for (port, message) in emitted {
                if let Some(dests) = self.routes.get(&(i, port)) {
                    for &(dest, dest_port) in dests {
                        self.slots[dest].inputs.push(dest_port, message.clone());
                    }
                }
                self.event_log.push(SimEvent::OutputEmitted {
                    time,
                    model: source.clone(),
                    port: port.to_string(),
                    message,
                });
            }
        }

        // Transition phase: exactly one transition per affected model.
        for i in 0..n {
            let slot = &mut self.slots[i];
            let has_input = slot.inputs.any_nonempty();
            if !imminent[i] && !has_input {
                continue;
            }
            let elapsed = time - slot.last_event;
            let ModelSlot { model, inputs, .. } = slot;
            let kind = if imminent[i] && has_input {
                model.confluent_transition(elapsed, inputs);
                TransitionKind::Confluent
            } else if imminent[i] {
                model.internal_transition();
                TransitionKind::Internal
            } else {
                model.external_transition(elapsed, inputs);
                TransitionKind::External
            };
            let name = model.name().to_string();
            let state = model.state_json();
            slot.last_event = time;
            self.event_log.push(SimEvent::TransitionApplied {
                time,
                model: name,
                kind,
                state,
            });
        }

        self.clock.advance_to(time);

        // Bags live for exactly one cycle.
        for slot in &mut self.slots {
            slot.inputs.clear();
            slot.outputs.clear();
        }
    }
}

/// Depth-first flattening: assign component ids, collect atomic slots in
/// construction order, and record every coupling as a port-graph edge.
fn flatten(
    coupled: CoupledModel,
    my_id: usize,
    next_id: &mut usize,
    slots: &mut Vec<ModelSlot>,
    atomic_slot: &mut HashMap<usize, usize>,
    edges: &mut HashMap<PortNode, Vec<PortNode>>,
) -> Result<(), SimulationError> {
    let CoupledModel {
        name,
        components,
        couplings,
        ..
    } = coupled;

    let mut child_ids: Vec<(String, usize)> = Vec::new();
    for component in components {
        let id = *next_id;
        *next_id += 1;
        child_ids.push((component.name().to_string(), id));
        match component {
            Component::Atomic(model) => {
                let inputs = PortBags::for_ports(model.input_ports());
                let outputs = PortBags::for_ports(model.output_ports());
                atomic_slot.insert(id, slots.len());
                slots.push(ModelSlot {
                    comp_id: id,
                    model,
                    last_event: 0.0,
                    inputs,
                    outputs,
                });
            }
            Component::Coupled(inner) => {
                flatten(inner, id, next_id, slots, atomic_slot, edges)?;
            }
        }
    }

    let child_id = |component: &str| -> Result<usize, SimulationError> {
        child_ids
            .iter()
            .find(|(n, _)| n == component)
            .map(|(_, id)| *id)
            .ok_or_else(|| SimulationError::UnknownComponent {
                model: name.clone(),
                component: component.to_string(),
            })
    };

    for coupling in couplings {
        let from = match coupling.from {
            Endpoint::Boundary(port) => (my_id, port, PortDir::In),
            Endpoint::Child(component, port) => (child_id(component)?, port, PortDir::Out),
        };
        let to = match coupling.to {
            Endpoint::Boundary(port) => (my_id, port, PortDir::Out),
            Endpoint::Child(component, port) => (child_id(component)?, port, PortDir::In),
        };
        edges.entry(from).or_default().push(to);
    }

    Ok(())
}

/// Resolve every atomic output port to its atomic destinations by walking
/// the coupling graph through coupled boundary ports.
fn resolve_routes(
    slots: &[ModelSlot],
    atomic_slot: &HashMap<usize, usize>,
    edges: &HashMap<PortNode, Vec<PortNode>>,
) -> HashMap<(usize, &'static str), Vec<(usize, &'static str)>> {
    let mut routes = HashMap::new();
    for (i, slot) in slots.iter().enumerate() {
        for spec in slot.model.output_ports() {
            let start: PortNode = (slot.comp_id, spec.name, PortDir::Out);
            let mut dests: Vec<(usize, &'static str)> = Vec::new();
            let mut visited: HashSet<PortNode> = HashSet::new();
            let mut queue: VecDeque<PortNode> = VecDeque::new();
            visited.insert(start);
            queue.push_back(start);
            while let Some(node) = queue.pop_front() {
                let Some(nexts) = edges.get(&node) else {
                    continue;
                };
                for &next in nexts {
                    if !visited.insert(next) {
                        continue;
                    }
                    match atomic_slot.get(&next.0) {
                        // Terminal: an atomic model's input port.
                        Some(&dest) => dests.push((dest, next.1)),
                        // A coupled boundary port: keep walking.
                        None => queue.push_back(next),
                    }
                }
            }
            if !dests.is_empty() {
                routes.insert((i, spec.name), dests);
            }
        }
    }
    routes
}
