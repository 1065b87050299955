//! Long-lived owner of the availability state.
//!
//! One [`AvailabilityService`] per process. Every query goes through
//! [`AvailabilityService::get_status`], which refreshes the store under a mutex
//! so at most one refresh runs at a time. Reloads build the new store outside the
//! lock and swap it in whole; readers never observe a half-built store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{error, info, warn};

use crate::campus::Campus;
use crate::error::{AuleError, Result};
use crate::initializer::initialize;
use crate::lesson::Lesson;
use crate::refresher::refresh;
use crate::registry::{RegistryBackend, RoomRegistry};
use crate::store::AvailabilityStore;

/// Supplies the lessons scheduled on a given civil day.
pub trait LessonSource {
    fn lessons_for(&self, day: NaiveDate) -> Result<Vec<Lesson>>;
}

/// A fixed list of lessons, whatever day is asked for.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    lessons: Vec<Lesson>,
}

impl StaticSource {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }
}

impl LessonSource for StaticSource {
    fn lessons_for(&self, _day: NaiveDate) -> Result<Vec<Lesson>> {
        Ok(self.lessons.clone())
    }
}

#[derive(Debug, Default)]
struct State {
    /// Civil day the store was built for; `None` before the first reload.
    day: Option<NaiveDate>,
    store: AvailabilityStore,
    registry: RoomRegistry,
}

pub struct AvailabilityService<B: RegistryBackend> {
    campus: Campus,
    backend: B,
    state: Mutex<State>,
}

impl<B: RegistryBackend> AvailabilityService<B> {
    /// Create the service, loading the room registry from `backend`.
    ///
    /// A registry that fails to load is logged and replaced by an empty one.
    pub fn new(campus: Campus, backend: B) -> Self {
        let registry = match backend.load() {
            Ok(registry) => {
                info!(rooms = registry.len(), "room registry loaded");
                registry
            }
            Err(e) => {
                warn!(error = %e, "room registry unavailable, starting empty");
                RoomRegistry::new()
            }
        };
        Self {
            campus,
            backend,
            state: Mutex::new(State {
                day: None,
                store: AvailabilityStore::new(),
                registry,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the store with one built from `lessons` for `now`'s day.
    ///
    /// Returns the configuration errors hit while building; they never prevent
    /// the other buildings from loading.
    pub fn reload(&self, lessons: &[Lesson], now: NaiveDateTime) -> Vec<AuleError> {
        let registry = self.lock().registry.clone();
        let init = initialize(lessons, &self.campus, &registry, now);

        let mut state = self.lock();
        state.store = init.store;
        state.day = Some(now.date());

        let State {
            store, registry, ..
        } = &mut *state;
        let added = registry.observe(store, true);
        if registry.is_dirty() {
            match self.backend.save(registry) {
                Ok(()) => {
                    registry.mark_saved();
                    info!(added, "room registry saved");
                }
                Err(e) => warn!(error = %e, "failed to save room registry"),
            }
        }

        init.errors
    }

    /// Reload from `source` when the store was built for a different day than `now`.
    ///
    /// Returns `Ok(None)` when the store is already current, and `Ok(Some(errors))`
    /// after a reload, carrying the configuration errors that reload hit. On a
    /// source failure the previous store stays in service and the error is returned.
    pub fn ensure_current(
        &self,
        now: NaiveDateTime,
        source: &dyn LessonSource,
    ) -> Result<Option<Vec<AuleError>>> {
        if !self.is_stale(now.date()) {
            return Ok(None);
        }
        info!(day = %now.date(), "calendars missing or outdated, reloading");
        let lessons = source.lessons_for(now.date()).map_err(|e| {
            error!(error = %e, "lesson source failed");
            e
        })?;
        Ok(Some(self.reload(&lessons, now)))
    }

    /// Whether the store was built for a day other than `today`.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.lock().day != Some(today)
    }

    /// Refresh the store for `now` and return a snapshot of it.
    pub fn get_status(&self, now: NaiveDateTime) -> AvailabilityStore {
        let mut state = self.lock();
        let State {
            store, registry, ..
        } = &mut *state;
        refresh(store, &self.campus, registry, now);
        store.clone()
    }

    /// A copy of the current registry.
    pub fn registry(&self) -> RoomRegistry {
        self.lock().registry.clone()
    }
}
