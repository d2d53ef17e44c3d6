use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoirError {
    #[error("Invalid unlock date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("PINs do not match or PIN is empty")]
    PinMismatch,

    #[error("Wrong PIN ({remaining} attempts remaining)")]
    WrongPin { remaining: u32 },

    #[error("Too many wrong PIN attempts")]
    AttemptsExhausted,

    #[error("No memory at index {0}")]
    IndexOutOfRange(usize),

    #[error("This memory is locked until {0}")]
    StillLocked(NaiveDate),

    #[error("Encryption failed")]
    Encryption,

    #[error("Decryption failed (authentication tag mismatch, wrong key or tampered data)")]
    Decryption,

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
