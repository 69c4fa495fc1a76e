//! Event logging for external sinks.
//!
//! The coordinator records what happened each cycle - which models produced
//! output on which ports, and which models changed state under which
//! transition - into an append-only [`EventLog`]. The log is the whole
//! observability surface of the core: the CSV/console sinks are external
//! collaborators that consume it, one delimited text record per event.
//!
//! # Example
//!
//! ```rust
//! use market_simulator_core::{EventLog, Message, SimEvent};
//!
//! let mut log = EventLog::new();
//! log.push(SimEvent::OutputEmitted {
//!     time: 30.0,
//!     model: "ShockEvent".to_string(),
//!     port: "shock_out".to_string(),
//!     message: Message::Price(-10.0),
//! });
//!
//! let mut csv = Vec::new();
//! log.write_delimited(&mut csv, ';').unwrap();
//! ```

use crate::devs::message::Message;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};

/// Which dispatch rule fired for a model in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransitionKind {
    Internal,
    External,
    Confluent,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Internal => write!(f, "internal"),
            TransitionKind::External => write!(f, "external"),
            TransitionKind::Confluent => write!(f, "confluent"),
        }
    }
}

/// One recorded simulation event.
///
/// Every event carries the virtual time it occurred at and the identifier of
/// the model involved; events appear in the log in the order they occurred
/// within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    /// A model emitted a message on an output port.
    OutputEmitted {
        time: f64,
        model: String,
        port: String,
        message: Message,
    },

    /// A model's state changed under one of the three transition rules.
    TransitionApplied {
        time: f64,
        model: String,
        kind: TransitionKind,
        state: Value,
    },
}

impl SimEvent {
    pub fn time(&self) -> f64 {
        match self {
            SimEvent::OutputEmitted { time, .. } => *time,
            SimEvent::TransitionApplied { time, .. } => *time,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            SimEvent::OutputEmitted { model, .. } => model,
            SimEvent::TransitionApplied { model, .. } => model,
        }
    }
}

/// Append-only log of all simulation events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded at exactly the given virtual time.
    pub fn at_time(&self, time: f64) -> impl Iterator<Item = &SimEvent> {
        self.events.iter().filter(move |e| e.time() == time)
    }

    /// Messages a model emitted on one port, over the whole run.
    pub fn outputs_on<'a>(
        &'a self,
        model: &'a str,
        port: &'a str,
    ) -> impl Iterator<Item = (f64, &'a Message)> {
        self.events.iter().filter_map(move |event| match event {
            SimEvent::OutputEmitted {
                time,
                model: m,
                port: p,
                message,
            } if m == model && p == port => Some((*time, message)),
            _ => None,
        })
    }

    /// Write the log as delimited text, one record per event:
    /// `time<sep>model<sep>record-kind<sep>port<sep>value`.
    ///
    /// Transition records leave the port column empty and carry the state
    /// snapshot as the value; output records carry the serialized message.
    pub fn write_delimited<W: Write>(&self, writer: &mut W, sep: char) -> io::Result<()> {
        writeln!(writer, "time{sep}model{sep}kind{sep}port{sep}value")?;
        for event in &self.events {
            match event {
                SimEvent::OutputEmitted {
                    time,
                    model,
                    port,
                    message,
                } => {
                    let value = serde_json::to_string(message)
                        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                    writeln!(writer, "{time}{sep}{model}{sep}output{sep}{port}{sep}{value}")?;
                }
                SimEvent::TransitionApplied {
                    time,
                    model,
                    kind,
                    state,
                } => {
                    writeln!(writer, "{time}{sep}{model}{sep}{kind}{sep}{sep}{state}")?;
                }
            }
        }
        Ok(())
    }
}
