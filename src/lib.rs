//! A passive UDS (ISO 14229) sniffer for an in-vehicle safety gateway.
//!
//! The gateway sits between a driver-assist computer and the vehicle's CAN
//! buses. It never transmits diagnostic requests of its own; it only
//! observes traffic, reassembles multi-frame ISO-TP sessions into complete
//! UDS messages, classifies them, and dispatches typed events to a couple
//! of thin consumers: a vehicle-variant fingerprint resolver and a
//! forward-bus interceptor. See `DESIGN.md` for how each module grounds
//! back to the original firmware it was modeled on.

pub mod isotp; // ISO-TP (ISO 15765-2) reassembly engine
pub mod uds; // UDS (ISO 14229) message classifier
pub mod sniffer; // façade: enable/disable, callback wiring, dispatch
pub mod fingerprint; // vehicle-variant fingerprint resolver
pub mod interceptor; // forward-bus interceptor state machine
pub mod safety_guard; // illustrative per-OEM TX safety guard sketch

// Common types and traits
pub mod error;
pub mod types;

pub use fingerprint::{FingerprintResolver, SteeringParams};
pub use interceptor::{Bus, ForwardInterceptor, ForwardVerdict, TxVerdict};
pub use sniffer::UdsSniffer;
pub use uds::UdsMessage;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
