//! MemoryService: the behavioural core.
//!
//! Encrypt-on-write, decrypt-on-read-if-unlocked. The unlock-date check is
//! a read gate only: it never blocks storage or deletion, and
//! `reveal_memory` is the single place it is enforced. Locked ciphertext
//! is never decrypted, not even transiently.

use base64::{engine::general_purpose, Engine as _};
use chrono::{Local, NaiveDate};
use tracing::info;
use uuid::Uuid;

use crate::crypto;
use crate::error::MemoirError;
use crate::keystore::KeyStore;
use crate::store::{Entry, RecordStore};

/// One row of a listing: everything the front-end may show about an entry
/// without decrypting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySummary {
    pub index: usize,
    pub id: Uuid,
    pub unlock_date: NaiveDate,
    pub unlocked: bool,
}

pub struct MemoryService {
    keys: KeyStore,
    store: RecordStore,
}

impl MemoryService {
    pub fn new(keys: KeyStore, store: RecordStore) -> Self {
        Self { keys, store }
    }

    /// Parse an unlock date in the on-disk `YYYY-MM-DD` form.
    pub fn parse_unlock_date(input: &str) -> Result<NaiveDate, MemoirError> {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map_err(|_| MemoirError::InvalidDate(input.to_string()))
    }

    /// Encrypt `text` and append it with its unlock date. The date is
    /// validated before anything is written; a bad date leaves the
    /// collection untouched. Returns the new entry's id.
    pub fn add_memory(&self, text: &str, unlock_date: &str) -> Result<Uuid, MemoirError> {
        let unlock_date = Self::parse_unlock_date(unlock_date)?;
        let ciphertext = crypto::encrypt(self.keys.key(), text.as_bytes())?;
        let entry = Entry {
            id: Uuid::new_v4(),
            memory: general_purpose::STANDARD.encode(ciphertext),
            unlock_date,
        };
        let id = entry.id;
        self.store.append(entry)?;
        info!("added memory {id} unlocking {unlock_date}");
        Ok(id)
    }

    pub fn list_memories(&self) -> Result<Vec<MemorySummary>, MemoirError> {
        self.list_memories_on(today())
    }

    /// `unlocked` is evaluated against `today`; nothing is decrypted.
    pub fn list_memories_on(&self, today: NaiveDate) -> Result<Vec<MemorySummary>, MemoirError> {
        let entries = self.store.load_all()?;
        Ok(entries
            .iter()
            .enumerate()
            .map(|(index, entry)| MemorySummary {
                index,
                id: entry.id,
                unlock_date: entry.unlock_date,
                unlocked: today >= entry.unlock_date,
            })
            .collect())
    }

    pub fn reveal_memory(&self, index: usize) -> Result<String, MemoirError> {
        self.reveal_memory_on(index, today())
    }

    /// Decrypt and return the plaintext at `index`, provided its unlock
    /// date has arrived. The date gate runs before any decryption is
    /// attempted.
    pub fn reveal_memory_on(&self, index: usize, today: NaiveDate) -> Result<String, MemoirError> {
        let entries = self.store.load_all()?;
        let entry = entries
            .get(index)
            .ok_or(MemoirError::IndexOutOfRange(index))?;
        if today < entry.unlock_date {
            return Err(MemoirError::StillLocked(entry.unlock_date));
        }
        let ciphertext = general_purpose::STANDARD
            .decode(&entry.memory)
            .map_err(|_| MemoirError::Decryption)?;
        let plaintext = crypto::decrypt(self.keys.key(), &ciphertext)?;
        String::from_utf8(plaintext.to_vec()).map_err(|_| MemoirError::Decryption)
    }

    /// Delete the entry at `index`, locked or not. Deletion is never gated
    /// by the unlock date; confirmation is the front-end's job.
    pub fn delete_memory(&self, index: usize) -> Result<Entry, MemoirError> {
        let removed = self.store.remove_at(index)?;
        info!(
            "deleted memory {} (unlock date {})",
            removed.id, removed.unlock_date
        );
        Ok(removed)
    }

    /// Remove every entry. Irreversible.
    pub fn delete_all(&self) -> Result<(), MemoirError> {
        self.store.save_all(&[])?;
        info!("deleted all memories");
        Ok(())
    }

    pub fn entry_count(&self) -> Result<usize, MemoirError> {
        Ok(self.store.load_all()?.len())
    }

    pub fn key_fingerprint(&self) -> String {
        self.keys.fingerprint()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
