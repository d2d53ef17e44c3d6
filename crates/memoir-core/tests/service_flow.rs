//! End-to-end flow over a temporary data directory: enroll the PIN, add
//! locked and unlocked memories, list, reveal, delete, and check that the
//! collection shifts as expected across reloads.

use chrono::NaiveDate;
use memoir_core::error::MemoirError;
use memoir_core::{paths, KeyStore, MemoryService, PinGate, RecordStore};
use tempfile::tempdir;

fn service_in(dir: &std::path::Path) -> MemoryService {
    let keys = KeyStore::load_or_create(paths::key_file(dir)).unwrap();
    let store = RecordStore::new(paths::data_file(dir));
    MemoryService::new(keys, store)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn full_diary_flow() {
    let dir = tempdir().unwrap();
    let today = date("2024-06-01");

    let mut gate = PinGate::load(paths::pin_file(dir.path())).unwrap();
    assert!(!gate.is_enrolled());
    gate.enroll("1234", "1234").unwrap();

    let service = service_in(dir.path());

    service.add_memory("hello", "2999-01-01").unwrap();
    let listing = service.list_memories_on(today).unwrap();
    assert_eq!(listing.len(), 1);
    assert!(!listing[0].unlocked);

    assert!(matches!(
        service.reveal_memory_on(0, today),
        Err(MemoirError::StillLocked(d)) if d == date("2999-01-01")
    ));

    service.add_memory("world", "2000-01-01").unwrap();
    let listing = service.list_memories_on(today).unwrap();
    assert_eq!(listing.len(), 2);
    assert!(listing[1].unlocked);
    assert_eq!(service.reveal_memory_on(1, today).unwrap(), "world");

    let world_id = listing[1].id;
    service.delete_memory(0).unwrap();
    let listing = service.list_memories_on(today).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].index, 0);
    assert_eq!(listing[0].id, world_id);
    assert_eq!(listing[0].unlock_date, date("2000-01-01"));
    assert_eq!(service.reveal_memory_on(0, today).unwrap(), "world");
}

#[test]
fn entries_survive_process_restart() {
    let dir = tempdir().unwrap();
    let today = date("2024-06-01");

    {
        let service = service_in(dir.path());
        service.add_memory("persisted", "2000-01-01").unwrap();
    }

    // A fresh KeyStore + RecordStore must read the same key and data.
    let service = service_in(dir.path());
    assert_eq!(service.reveal_memory_on(0, today).unwrap(), "persisted");
}

#[test]
fn pin_reverify_across_sessions() {
    let dir = tempdir().unwrap();
    {
        let mut gate = PinGate::load(paths::pin_file(dir.path())).unwrap();
        gate.enroll("4321", "4321").unwrap();
    }
    let mut gate = PinGate::load(paths::pin_file(dir.path())).unwrap();
    assert!(gate.is_enrolled());
    assert!(matches!(
        gate.verify("0000"),
        Err(MemoirError::WrongPin { remaining: 2 })
    ));
    gate.verify("4321").unwrap();
}

#[test]
fn replaced_key_file_breaks_decryption() {
    let dir = tempdir().unwrap();
    let service = service_in(dir.path());
    service.add_memory("secret", "2000-01-01").unwrap();

    // Replace the key file: entries stay on disk but fail integrity.
    std::fs::remove_file(paths::key_file(dir.path())).unwrap();
    let service = service_in(dir.path());
    assert_eq!(service.entry_count().unwrap(), 1);
    assert!(matches!(
        service.reveal_memory_on(0, date("2024-06-01")),
        Err(MemoirError::Decryption)
    ));
}
