//! Cryptographic helpers for the diary core.
//!
//! No custom crypto; every primitive comes from an audited crate.
//! Entry encryption uses XChaCha20-Poly1305 (32-byte key, random 24-byte
//! nonce, 16-byte tag). The PIN digest uses Argon2id under a random salt.
//!
//! Ciphertext wire format:
//!   [ nonce (24 bytes) | ciphertext + tag ]

use argon2::{Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng},
    XChaCha20Poly1305,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::MemoirError;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;
pub const PIN_SALT_LEN: usize = 16;
pub const PIN_HASH_LEN: usize = 32;

/// Generate a fresh random symmetric key. Zeroized on drop.
pub fn generate_key() -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    rand::rngs::OsRng.fill_bytes(key.as_mut());
    key
}

/// Encrypt `plaintext` with a 32-byte key, prepending a random 24-byte nonce.
/// The result carries everything needed to decrypt it later.
pub fn encrypt(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, MemoirError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| MemoirError::Encryption)?;

    let nonce = XChaCha20Poly1305::generate_nonce(&mut AeadOsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| MemoirError::Encryption)?;

    // Prepend nonce
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt wire-format bytes (nonce || ciphertext+tag).
pub fn decrypt(key: &[u8; KEY_LEN], data: &[u8]) -> Result<Zeroizing<Vec<u8>>, MemoirError> {
    if data.len() < NONCE_LEN {
        return Err(MemoirError::Decryption);
    }
    let (nonce_bytes, ct) = data.split_at(NONCE_LEN);
    let nonce = chacha20poly1305::XNonce::from_slice(nonce_bytes);

    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| MemoirError::Decryption)?;

    let plaintext = cipher
        .decrypt(nonce, ct)
        .map_err(|_| MemoirError::Decryption)?;

    Ok(Zeroizing::new(plaintext))
}

/// Generate a fresh random salt for PIN enrollment.
pub fn generate_salt() -> [u8; PIN_SALT_LEN] {
    let mut salt = [0u8; PIN_SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Argon2id parameters, tuned for interactive use.
fn argon2_params() -> Params {
    Params::new(
        64 * 1024, // m_cost: 64 MiB
        3,         // t_cost: 3 iterations
        1,         // p_cost: 1 thread
        Some(PIN_HASH_LEN),
    )
    .expect("Static Argon2 params are always valid")
}

/// Digest a PIN with Argon2id under the given salt.
/// The salt is stored alongside the digest (not secret).
pub fn hash_pin(pin: &str, salt: &[u8; PIN_SALT_LEN]) -> Result<[u8; PIN_HASH_LEN], MemoirError> {
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params());
    let mut out = [0u8; PIN_HASH_LEN];
    argon2
        .hash_password_into(pin.as_bytes(), salt, &mut out)
        .map_err(|e| MemoirError::KeyDerivation(e.to_string()))?;
    Ok(out)
}

/// Short fingerprint of the encryption key for display and logs.
/// Never log the key itself.
pub fn key_fingerprint(key: &[u8; KEY_LEN]) -> String {
    let digest = Sha256::digest(key);
    hex::encode(&digest[..8])
}
