//! Scheduling core for a court-booking backend: conflict detection,
//! availability queries, and the reservation lifecycle, serialized
//! per resource so double-bookings cannot be committed.

pub mod completer;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod store;

pub use engine::{Engine, EngineConfig, EngineError};
pub use model::{Ms, OpenWindow, Reservation, ReservationStatus, Resource, Span};
pub use store::{MemoryStore, NewReservation, ReservationPatch, ReservationStore};
