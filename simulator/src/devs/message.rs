//! Message types carried on ports.
//!
//! Every port is typed by a [`MessageKind`]; couplings are only legal between
//! ports of identical kind, checked at construction. The payloads form a
//! closed enum rather than string-typed values, so an invalid signal is
//! unrepresentable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// An order submitted by a trader, or an execution report priced by the
/// matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub side: Side,
    pub quantity: i64,
    pub price: f64,
}

impl Order {
    pub fn new(side: Side, quantity: i64, price: f64) -> Self {
        Self {
            side,
            quantity,
            price,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}, {}}}", self.side, self.quantity, self.price)
    }
}

/// Regulatory control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegSignal {
    Halt,
    Resume,
}

impl fmt::Display for RegSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegSignal::Halt => write!(f, "halt"),
            RegSignal::Resume => write!(f, "resume"),
        }
    }
}

/// A message travelling on a port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Order(Order),
    Signal(RegSignal),
    Price(f64),
}

/// The type tag of a port / message, used for coupling validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Order,
    Signal,
    Price,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Order => write!(f, "Order"),
            MessageKind::Signal => write!(f, "Signal"),
            MessageKind::Price => write!(f, "Price"),
        }
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Order(_) => MessageKind::Order,
            Message::Signal(_) => MessageKind::Signal,
            Message::Price(_) => MessageKind::Price,
        }
    }

    pub fn as_order(&self) -> Option<&Order> {
        match self {
            Message::Order(order) => Some(order),
            _ => None,
        }
    }

    pub fn as_signal(&self) -> Option<RegSignal> {
        match self {
            Message::Signal(signal) => Some(*signal),
            _ => None,
        }
    }

    pub fn as_price(&self) -> Option<f64> {
        match self {
            Message::Price(price) => Some(*price),
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Order(order) => write!(f, "{}", order),
            Message::Signal(signal) => write!(f, "{}", signal),
            Message::Price(price) => write!(f, "{}", price),
        }
    }
}
