//! PinGate: the access PIN protecting entry to the application.
//!
//! The PIN gates the front-end only; it is not a cryptographic secret and
//! is independent of the encryption key. The stored record holds a salted
//! Argon2id digest, never the PIN itself. Three wrong attempts in a
//! session exhaust the gate for good.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crypto::{self, PIN_HASH_LEN, PIN_SALT_LEN};
use crate::error::MemoirError;

pub const MAX_PIN_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PinRecord {
    salt: String,
    pin_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Unset,
    Locked,
    Unlocked,
}

pub struct PinGate {
    path: PathBuf,
    record: Option<PinRecord>,
    state: PinState,
    attempts: u32,
}

impl PinGate {
    /// Load the PIN record if one exists. The gate starts `Unset` on first
    /// run and `Locked` thereafter.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MemoirError> {
        let path = path.as_ref().to_path_buf();
        let record: Option<PinRecord> = if path.exists() {
            let json = fs::read_to_string(&path)?;
            Some(serde_json::from_str(&json)?)
        } else {
            None
        };
        let state = if record.is_some() {
            PinState::Locked
        } else {
            PinState::Unset
        };
        Ok(Self {
            path,
            record,
            state,
            attempts: 0,
        })
    }

    pub fn state(&self) -> PinState {
        self.state
    }

    pub fn is_enrolled(&self) -> bool {
        self.record.is_some()
    }

    pub fn attempts_remaining(&self) -> u32 {
        MAX_PIN_ATTEMPTS.saturating_sub(self.attempts)
    }

    /// First-run enrollment. Persists the salted digest and unlocks the
    /// gate. Rejects an empty PIN or a mismatched confirmation without
    /// writing anything.
    pub fn enroll(&mut self, pin: &str, confirm: &str) -> Result<(), MemoirError> {
        if self.record.is_some() {
            return Err(MemoirError::Storage("PIN already enrolled".into()));
        }
        if pin.trim().is_empty() || pin != confirm {
            return Err(MemoirError::PinMismatch);
        }
        let salt = crypto::generate_salt();
        let digest = crypto::hash_pin(pin, &salt)?;
        let record = PinRecord {
            salt: hex::encode(salt),
            pin_hash: hex::encode(digest),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&record)?)?;
        self.record = Some(record);
        self.state = PinState::Unlocked;
        debug!("PIN enrolled");
        Ok(())
    }

    /// Verify a PIN attempt against the stored digest. A correct PIN
    /// unlocks the gate and mutates no persisted state. The third wrong
    /// attempt, and every call after it, returns `AttemptsExhausted`.
    pub fn verify(&mut self, pin: &str) -> Result<(), MemoirError> {
        if self.attempts >= MAX_PIN_ATTEMPTS {
            return Err(MemoirError::AttemptsExhausted);
        }
        let record = self
            .record
            .as_ref()
            .ok_or_else(|| MemoirError::Storage("no PIN enrolled".into()))?;
        let salt = decode_salt(&record.salt)?;
        let expected = decode_digest(&record.pin_hash)?;
        let digest = crypto::hash_pin(pin, &salt)?;
        if digest == expected {
            self.state = PinState::Unlocked;
            self.attempts = 0;
            return Ok(());
        }
        self.attempts += 1;
        warn!("wrong PIN attempt {} of {}", self.attempts, MAX_PIN_ATTEMPTS);
        if self.attempts >= MAX_PIN_ATTEMPTS {
            Err(MemoirError::AttemptsExhausted)
        } else {
            Err(MemoirError::WrongPin {
                remaining: self.attempts_remaining(),
            })
        }
    }
}

fn decode_salt(hex_salt: &str) -> Result<[u8; PIN_SALT_LEN], MemoirError> {
    let bytes =
        hex::decode(hex_salt).map_err(|e| MemoirError::Storage(format!("pin salt: {e}")))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| MemoirError::Storage("pin salt length invalid".into()))
}

fn decode_digest(hex_digest: &str) -> Result<[u8; PIN_HASH_LEN], MemoirError> {
    let bytes =
        hex::decode(hex_digest).map_err(|e| MemoirError::Storage(format!("pin digest: {e}")))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| MemoirError::Storage("pin digest length invalid".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gate_in(dir: &Path) -> PinGate {
        PinGate::load(dir.join("pin.json")).unwrap()
    }

    #[test]
    fn starts_unset_then_locked_after_enroll() {
        let dir = tempdir().unwrap();
        let mut gate = gate_in(dir.path());
        assert_eq!(gate.state(), PinState::Unset);
        gate.enroll("1234", "1234").unwrap();
        assert_eq!(gate.state(), PinState::Unlocked);

        let reloaded = gate_in(dir.path());
        assert_eq!(reloaded.state(), PinState::Locked);
        assert!(reloaded.is_enrolled());
    }

    #[test]
    fn enroll_rejects_mismatch_and_empty() {
        let dir = tempdir().unwrap();
        let mut gate = gate_in(dir.path());
        assert!(matches!(
            gate.enroll("1234", "4321"),
            Err(MemoirError::PinMismatch)
        ));
        assert!(matches!(
            gate.enroll("   ", "   "),
            Err(MemoirError::PinMismatch)
        ));
        assert!(!dir.path().join("pin.json").exists());
        assert_eq!(gate.state(), PinState::Unset);
    }

    #[test]
    fn verify_accepts_correct_pin() {
        let dir = tempdir().unwrap();
        gate_in(dir.path()).enroll("1234", "1234").unwrap();
        let mut gate = gate_in(dir.path());
        gate.verify("1234").unwrap();
        assert_eq!(gate.state(), PinState::Unlocked);
    }

    #[test]
    fn correct_pin_on_second_attempt_succeeds() {
        let dir = tempdir().unwrap();
        gate_in(dir.path()).enroll("1234", "1234").unwrap();
        let before = fs::read_to_string(dir.path().join("pin.json")).unwrap();

        let mut gate = gate_in(dir.path());
        assert!(matches!(
            gate.verify("0000"),
            Err(MemoirError::WrongPin { remaining: 2 })
        ));
        gate.verify("1234").unwrap();

        // Verification never rewrites the record.
        let after = fs::read_to_string(dir.path().join("pin.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn three_wrong_attempts_exhaust_the_gate() {
        let dir = tempdir().unwrap();
        gate_in(dir.path()).enroll("1234", "1234").unwrap();
        let mut gate = gate_in(dir.path());
        assert!(matches!(
            gate.verify("0000"),
            Err(MemoirError::WrongPin { remaining: 2 })
        ));
        assert!(matches!(
            gate.verify("1111"),
            Err(MemoirError::WrongPin { remaining: 1 })
        ));
        assert!(matches!(
            gate.verify("2222"),
            Err(MemoirError::AttemptsExhausted)
        ));
        // Even the correct PIN is refused once exhausted.
        assert!(matches!(
            gate.verify("1234"),
            Err(MemoirError::AttemptsExhausted)
        ));
    }

    #[test]
    fn malformed_pin_file_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pin.json"), "not json").unwrap();
        assert!(matches!(
            PinGate::load(dir.path().join("pin.json")),
            Err(MemoirError::Serialisation(_))
        ));
    }
}
