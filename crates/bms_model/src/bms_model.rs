//! BMS Model - Core data model for the building management system
//!
//! This crate contains the pure building model: buildings made of floors,
//! floors made of rooms, rooms carrying sensors and an optional hazard
//! evaluator, and a per-floor maintenance rotation. It performs no I/O.
//!
//! ## Structure
//!
//! ```text
//! Building
//! └── Floor (1 = ground, each fits within the one below)
//!     ├── Room
//!     │   ├── Sensor (at most one per kind)
//!     │   └── HazardEvaluator (rule-based or weighting-based)
//!     └── MaintenanceRotation (indices into the floor's rooms)
//! ```
//!
//! Time is simulated: everything that changes per minute implements
//! [`TimedItem`] and is driven by a [`Scheduler`].

mod building;
mod error;
mod floor;
mod hazard;
mod maintenance;
mod recommender;
mod room;
mod sensors;
mod timed;

pub use building::*;
pub use error::*;
pub use floor::*;
pub use hazard::*;
pub use maintenance::*;
pub use recommender::*;
pub use room::*;
pub use sensors::*;
pub use timed::*;
