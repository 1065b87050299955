//! Tests for the availability service: reloads, daily rollover, registry upkeep.

use aule_engine::campus::{Campus, Coordinates};
use aule_engine::error::Result;
use aule_engine::hours::{ClockTime, HoursRule, MON_FRI};
use aule_engine::{
    AuleError, AvailabilityService, Lesson, LessonSource, MemoryBackend, RegistryBackend,
    RoomRegistry, StaticSource,
};
use chrono::{NaiveDate, NaiveDateTime};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Monday 2026-03-16 at the given time.
fn t(hour: u32, minute: u32) -> NaiveDateTime {
    at(16, hour, minute)
}

fn campus() -> Campus {
    Campus::new().with_building(
        "main",
        Coordinates { lon: 10.0, lat: 43.0 },
        vec![HoursRule::open(
            MON_FRI,
            ClockTime::hm(8, 0),
            ClockTime::hm(20, 0),
        )],
    )
}

fn lesson(room: &str, start: NaiveDateTime, end: NaiveDateTime) -> Lesson {
    Lesson::new(room, "main", start, end, "Bianchi Luca X")
}

struct FailingSource;

impl LessonSource for FailingSource {
    fn lessons_for(&self, _day: NaiveDate) -> Result<Vec<Lesson>> {
        Err(AuleError::Source("calendar endpoint unreachable".into()))
    }
}

// ── Reload + status ─────────────────────────────────────────────────────────

#[test]
fn status_before_reload_is_empty() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());
    assert!(service.get_status(t(10, 0)).is_empty());
    assert!(service.is_stale(t(10, 0).date()));
}

#[test]
fn reload_registers_new_rooms_as_usually_open() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());

    let errors = service.reload(&[lesson("M1", t(10, 0), t(11, 0))], t(9, 0));

    assert!(errors.is_empty());
    assert!(service.registry().usually_open("main", "M1"));
    assert!(service.backend().snapshot().usually_open("main", "M1"));

    let status = service.get_status(t(9, 0));
    assert!(status.room("main", "M1").unwrap().free);
    assert!(status.building("main").unwrap().free);
}

#[test]
fn scenario_lesson_lifecycle_through_service() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());
    service.reload(&[lesson("R", t(10, 0), t(11, 0))], t(9, 0));

    let status = service.get_status(t(10, 30));
    let room = status.room("main", "R").unwrap();
    assert!(!room.free);

    let status = service.get_status(t(10, 35));
    assert!(status.room("main", "R").unwrap().available_soon);

    let status = service.get_status(t(11, 5));
    let room = status.room("main", "R").unwrap();
    assert!(room.lessons.is_empty());
    assert!(room.free);
    assert!(!room.available_soon);
}

#[test]
fn registry_flag_from_backend_suppresses_free() {
    let mut registry = RoomRegistry::new();
    registry.record_seen("main", "Storage", false);
    let service = AvailabilityService::new(campus(), MemoryBackend::new(registry));

    service.reload(&[lesson("M1", t(10, 0), t(11, 0))], t(10, 30));
    let status = service.get_status(t(10, 30));

    let main = status.building("main").unwrap();
    assert!(!main.rooms["Storage"].free);
    assert!(!main.rooms["M1"].free);
    assert!(!main.free);
}

#[test]
fn reload_returns_configuration_errors() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());

    let errors = service.reload(
        &[
            Lesson::new("G1", "ghost", t(10, 0), t(11, 0), ""),
            lesson("M1", t(10, 0), t(11, 0)),
        ],
        t(9, 0),
    );

    assert_eq!(errors.len(), 1);
    assert!(service.get_status(t(9, 0)).building("main").is_some());
}

#[test]
fn reload_replaces_previous_store() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());
    service.reload(&[lesson("OLD", t(10, 0), t(11, 0))], t(9, 0));

    service.reload(&[lesson("NEW", at(17, 10, 0), at(17, 11, 0))], at(17, 9, 0));

    let status = service.get_status(at(17, 9, 0));
    let main = status.building("main").unwrap();
    assert!(main.rooms.contains_key("NEW"));
    // OLD is remembered by the registry and seeded as an empty room.
    assert!(main.rooms["OLD"].lessons.is_empty());
}

// ── Daily rollover ──────────────────────────────────────────────────────────

#[test]
fn ensure_current_reloads_once_per_day() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());
    let source = StaticSource::new(vec![lesson("M1", t(10, 0), t(11, 0))]);

    assert!(service.ensure_current(t(9, 0), &source).unwrap().is_some());
    assert!(service.ensure_current(t(9, 30), &source).unwrap().is_none());
    assert!(service.ensure_current(at(17, 9, 0), &source).unwrap().is_some());
}

#[test]
fn ensure_current_returns_unknown_building_errors() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());
    let source = StaticSource::new(vec![
        Lesson::new("G1", "ghost", t(10, 0), t(11, 0), "Neri Paolo X"),
        lesson("M1", t(10, 0), t(11, 0)),
    ]);

    let errors = service
        .ensure_current(t(10, 30), &source)
        .unwrap()
        .expect("stale store should reload");

    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], AuleError::UnknownBuilding(name) if name == "ghost"));
    let status = service.get_status(t(10, 30));
    assert!(status.building("ghost").is_none());
    assert!(status.room("main", "M1").is_some());

    // Already current: no reload, nothing to report.
    assert!(service.ensure_current(t(10, 45), &source).unwrap().is_none());
}

#[test]
fn failed_source_keeps_previous_store() {
    let service = AvailabilityService::new(campus(), MemoryBackend::default());
    service.reload(&[lesson("M1", t(10, 0), t(11, 0))], t(9, 0));

    let result = service.ensure_current(at(17, 9, 0), &FailingSource);

    assert!(matches!(result, Err(AuleError::Source(_))));
    assert!(service.is_stale(at(17, 9, 0).date()));
    assert!(service
        .get_status(t(10, 30))
        .room("main", "M1")
        .is_some());
}

// ── Registry backend failures ───────────────────────────────────────────────

struct BrokenBackend;

impl RegistryBackend for BrokenBackend {
    fn load(&self) -> Result<RoomRegistry> {
        Err(AuleError::Registry("blob store offline".into()))
    }

    fn save(&self, _registry: &RoomRegistry) -> Result<()> {
        Err(AuleError::Registry("blob store offline".into()))
    }
}

#[test]
fn registry_backend_failures_are_not_fatal() {
    let service = AvailabilityService::new(campus(), BrokenBackend);

    let errors = service.reload(&[lesson("M1", t(10, 0), t(11, 0))], t(9, 0));

    assert!(errors.is_empty());
    // The in-memory registry still learned the room.
    assert!(service.registry().usually_open("main", "M1"));
    assert!(service.registry().is_dirty());
    assert!(service.get_status(t(9, 0)).building("main").unwrap().free);
}
