//! memoir-core: the time-locked diary engine.
//!
//! Entries are encrypted at rest and cannot be read back until their
//! unlock date arrives. A PIN gates entry to the application; the
//! encryption key is a separate secret held in the key file. Losing the
//! key file makes every stored entry permanently unrecoverable.
//!
//! # Module layout
//! - `crypto`   - XChaCha20-Poly1305 entry encryption + Argon2id PIN digest
//! - `error`    - unified error type
//! - `keystore` - load-or-create persistence of the symmetric key
//! - `paths`    - per-user data directory and file locations
//! - `pin`      - PIN enrollment, verification, attempt limiting
//! - `store`    - ordered entry collection, atomic whole-file JSON persistence
//! - `service`  - encrypt-on-write / decrypt-on-read-if-unlocked core

pub mod crypto;
pub mod error;
pub mod keystore;
pub mod paths;
pub mod pin;
pub mod service;
pub mod store;

pub use error::MemoirError;
pub use keystore::KeyStore;
pub use pin::{PinGate, PinState, MAX_PIN_ATTEMPTS};
pub use service::{MemoryService, MemorySummary};
pub use store::{Entry, RecordStore};
