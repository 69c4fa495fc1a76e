//! Ports and per-cycle message bags.
//!
//! A port is a named, typed mailbox belonging to one model. During a cycle,
//! routing may append any number of messages to a destination port (multiple
//! concurrent writers form a "bag"); readers consume only the most recently
//! appended message. The full bag is retained so fan-in multiplicity stays
//! observable in the log, but the last-write-wins read policy is deliberate
//! and load-bearing. Bags are owned by the coordinator and cleared
//! unconditionally at the end of every cycle.

use crate::devs::message::{Message, MessageKind};
use serde::{Deserialize, Serialize};

/// Static description of a port: its name and the message kind it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: &'static str,
    pub kind: MessageKind,
}

impl PortSpec {
    pub const fn new(name: &'static str, kind: MessageKind) -> Self {
        Self { name, kind }
    }
}

/// A per-cycle message bag on a single port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bag {
    messages: Vec<Message>,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message (one more writer this cycle).
    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    /// The effective message: the most recently appended one.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// All bags of one model (inputs or outputs), keyed by port name.
///
/// Backed by a Vec in port-declaration order: models have a handful of ports,
/// and declaration order keeps iteration (and therefore logging)
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct PortBags {
    slots: Vec<(PortSpec, Bag)>,
}

impl PortBags {
    /// Build empty bags for the given port specs.
    pub fn for_ports(specs: &[PortSpec]) -> Self {
        Self {
            slots: specs.iter().map(|spec| (*spec, Bag::new())).collect(),
        }
    }

    /// The bag on the named port, if the port exists.
    pub fn bag(&self, port: &str) -> Option<&Bag> {
        self.slots
            .iter()
            .find(|(spec, _)| spec.name == port)
            .map(|(_, bag)| bag)
    }

    pub fn bag_mut(&mut self, port: &str) -> Option<&mut Bag> {
        self.slots
            .iter_mut()
            .find(|(spec, _)| spec.name == port)
            .map(|(_, bag)| bag)
    }

    /// The effective (most recent) message on the named port.
    pub fn latest(&self, port: &str) -> Option<&Message> {
        self.bag(port).and_then(Bag::latest)
    }

    /// Append a message to the named port. Returns false if the port does
    /// not exist; routes are validated at construction, so that only happens
    /// on a caller bug.
    pub fn push(&mut self, port: &str, msg: Message) -> bool {
        match self.bag_mut(port) {
            Some(bag) => {
                bag.push(msg);
                true
            }
            None => false,
        }
    }

    /// True if any port received at least one message this cycle.
    pub fn any_nonempty(&self) -> bool {
        self.slots.iter().any(|(_, bag)| !bag.is_empty())
    }

    /// Drop all messages (end of cycle).
    pub fn clear(&mut self) {
        for (_, bag) in &mut self.slots {
            bag.clear();
        }
    }

    /// Iterate ports and bags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&PortSpec, &Bag)> {
        self.slots.iter().map(|(spec, bag)| (spec, bag))
    }
}
