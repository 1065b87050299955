//! # aule-engine
//!
//! Real-time classroom availability for a multi-building university campus.
//!
//! Given today's lessons per room, the engine keeps a per-building, per-room view
//! of which rooms are free now and which will free up within half an hour. The
//! view is built once per day and refreshed cheaply on every query.
//!
//! ## Modules
//!
//! - [`hours`] -- Opening-hours rules and the `is_closed` policy
//! - [`campus`] -- Building catalog (coordinates + hours), civil-time clock
//! - [`lesson`] -- Lesson input records and interval predicates
//! - [`format`] -- Occupant label cleanup for display
//! - [`store`] -- Availability state: buildings, rooms, scheduled lessons
//! - [`registry`] -- Persisted "usually open" room flags and their backends
//! - [`initializer`] -- Daily build of the store from lessons
//! - [`refresher`] -- Per-query pruning and flag recomputation
//! - [`service`] -- Single-writer service wrapping store, registry and reloads
//! - [`error`] -- Error types

pub mod campus;
pub mod error;
pub mod format;
pub mod hours;
pub mod initializer;
pub mod lesson;
pub mod refresher;
pub mod registry;
pub mod service;
pub mod store;

pub use campus::{Campus, Coordinates, CAMPUS_TIMEZONE};
pub use error::AuleError;
pub use initializer::{initialize, Initialization};
pub use lesson::Lesson;
pub use refresher::{refresh, RefreshSummary};
pub use registry::{JsonFileBackend, MemoryBackend, RegistryBackend, RoomRegistry};
pub use service::{AvailabilityService, LessonSource, StaticSource};
pub use store::{AvailabilityStore, BuildingState, RoomState};
