//! # Tendril Mesh
//!
//! In-process communication layer: a type-keyed publish/subscribe bus
//! with validated topics, enveloped messages, and all-or-nothing
//! concurrent handler dispatch.

pub mod bus;
pub mod error;
pub mod message;

pub use bus::{HandlerError, MessageBus, MessageHandler, Subscription};
pub use error::{BusError, BusResult};
pub use message::{Envelope, MessageId, Topic};
