//! Tests for the room registry and its backends.

use aule_engine::campus::Coordinates;
use aule_engine::registry::RegistryRow;
use aule_engine::{
    AvailabilityStore, JsonFileBackend, MemoryBackend, RegistryBackend, RoomRegistry,
};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("aule-registry-{}-{}.json", name, std::process::id()))
}

#[test]
fn unseen_room_is_not_usually_open() {
    let registry = RoomRegistry::new();
    assert!(!registry.usually_open("poloA", "A1"));
}

#[test]
fn record_seen_never_overwrites() {
    let mut registry = RoomRegistry::new();

    assert!(registry.record_seen("poloA", "Storage", false));
    assert!(!registry.record_seen("poloA", "Storage", true));

    assert!(!registry.usually_open("poloA", "Storage"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn observe_appends_only_new_rooms() {
    let here = Coordinates { lon: 10.0, lat: 43.0 };
    let mut store = AvailabilityStore::new();
    let building = store.building_entry("poloA", here);
    building.room_mut("A1");
    building.room_mut("A2");

    let mut registry = RoomRegistry::new();
    registry.record_seen("poloA", "A1", false);
    registry.mark_saved();

    let added = registry.observe(&store, true);

    assert_eq!(added, 1);
    assert!(registry.is_dirty());
    assert!(!registry.usually_open("poloA", "A1"));
    assert!(registry.usually_open("poloA", "A2"));

    registry.mark_saved();
    assert_eq!(registry.observe(&store, true), 0);
    assert!(!registry.is_dirty());
}

#[test]
fn serializes_as_rows() {
    let mut registry = RoomRegistry::new();
    registry.record_seen("poloB", "B1", true);
    registry.record_seen("poloA", "Storage", false);

    let json = serde_json::to_value(&registry).unwrap();

    assert_eq!(
        json,
        serde_json::json!([
            {"building": "poloA", "room": "Storage", "usuallyOpen": false},
            {"building": "poloB", "room": "B1", "usuallyOpen": true}
        ])
    );
}

#[test]
fn deserialized_registry_is_clean_and_keeps_first_row() {
    let rows = vec![
        RegistryRow {
            building: "poloA".into(),
            room: "A1".into(),
            usually_open: false,
        },
        RegistryRow {
            building: "poloA".into(),
            room: "A1".into(),
            usually_open: true,
        },
    ];

    let registry = RoomRegistry::from(rows);

    assert!(!registry.is_dirty());
    assert_eq!(registry.len(), 1);
    assert!(!registry.usually_open("poloA", "A1"));
}

#[test]
fn json_file_backend_missing_file_loads_empty() {
    let backend = JsonFileBackend::new(temp_path("missing"));
    let registry = backend.load().unwrap();
    assert!(registry.is_empty());
}

#[test]
fn json_file_backend_saves_and_loads() {
    let path = temp_path("roundtrip");
    let _ = std::fs::remove_file(&path);
    let backend = JsonFileBackend::new(&path);

    let mut registry = RoomRegistry::new();
    registry.record_seen("poloC", "C2", true);
    registry.record_seen("poloC", "Deposito", false);
    backend.save(&registry).unwrap();

    let loaded = backend.load().unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.usually_open("poloC", "C2"));
    assert!(!loaded.usually_open("poloC", "Deposito"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn json_file_backend_rejects_garbage() {
    let path = temp_path("garbage");
    std::fs::write(&path, "not json").unwrap();

    let result = JsonFileBackend::new(&path).load();
    assert!(result.is_err());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn memory_backend_keeps_last_save() {
    let backend = MemoryBackend::default();
    let mut registry = RoomRegistry::new();
    registry.record_seen("poloA", "A1", true);

    backend.save(&registry).unwrap();

    let loaded = backend.load().unwrap();
    assert!(loaded.usually_open("poloA", "A1"));
    assert!(!loaded.is_dirty());
}
