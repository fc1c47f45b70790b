// src/crypto.rs

//! AES-CBC encryption for Bark's encrypted push mode.
//!
//! Bark accepts a base64 ciphertext plus the IV as query parameters and
//! decrypts with the key configured on the device. Every call builds a new
//! cipher from the configured key and IV, so messages never share chaining
//! state and each one decrypts on its own.

use std::fmt;
use std::str::FromStr;

use aes::{Aes128, Aes192, Aes256};
use base64::{Engine as _, engine::general_purpose};
use cbc::cipher::block_padding::{Pkcs7, UnpadError};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// AES block size; also the required IV length.
pub const IV_LEN: usize = 16;

/// How configured key/IV strings are turned into bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// Use the UTF-8 bytes of the string as-is (Bark's own convention).
    #[default]
    Raw,
    /// Decode the string as hexadecimal.
    Hex,
}

impl KeyEncoding {
    fn decode(self, label: &str, material: &str) -> Result<Vec<u8>> {
        match self {
            Self::Raw => Ok(material.as_bytes().to_vec()),
            Self::Hex => hex::decode(material.trim())
                .map_err(|e| AppError::config(format!("{label} is not valid hex: {e}"))),
        }
    }
}

impl FromStr for KeyEncoding {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "hex" => Ok(Self::Hex),
            other => Err(AppError::config(format!(
                "unknown key encoding '{other}' (expected 'raw' or 'hex')"
            ))),
        }
    }
}

/// AES variant chosen from the key length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    fn from_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            other => Err(AppError::config(format!(
                "encryption key must be 16, 24 or 32 bytes, got {other}"
            ))),
        }
    }
}

/// Ciphertext and the IV declared next to it on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    pub ciphertext: String,
    pub iv: String,
}

/// Configured key and IV, ready to encrypt payloads.
#[derive(Clone)]
pub struct SecureChannel {
    key: Vec<u8>,
    iv: [u8; IV_LEN],
    key_size: KeySize,
    /// IV exactly as configured, sent alongside each ciphertext
    declared_iv: String,
}

impl SecureChannel {
    /// Build a channel from configured key and IV strings.
    pub fn new(key: &str, iv: &str, encoding: KeyEncoding) -> Result<Self> {
        let key_bytes = encoding.decode("encryption key", key)?;
        let key_size = KeySize::from_len(key_bytes.len())?;

        let iv_bytes = encoding.decode("encryption IV", iv)?;
        let iv_arr: [u8; IV_LEN] = iv_bytes.as_slice().try_into().map_err(|_| {
            AppError::config(format!(
                "encryption IV must be {IV_LEN} bytes, got {}",
                iv_bytes.len()
            ))
        })?;

        Ok(Self {
            key: key_bytes,
            iv: iv_arr,
            key_size,
            declared_iv: iv.to_string(),
        })
    }

    pub fn key_size(&self) -> KeySize {
        self.key_size
    }

    /// The IV string transmitted with every ciphertext.
    pub fn declared_iv(&self) -> &str {
        &self.declared_iv
    }

    /// Encrypt `plaintext` and return the base64 ciphertext.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let bytes = plaintext.as_bytes();
        let ciphertext = match self.key_size {
            KeySize::Aes128 => cbc::Encryptor::<Aes128>::new_from_slices(&self.key, &self.iv)
                .map_err(AppError::encoding)?
                .encrypt_padded_vec_mut::<Pkcs7>(bytes),
            KeySize::Aes192 => cbc::Encryptor::<Aes192>::new_from_slices(&self.key, &self.iv)
                .map_err(AppError::encoding)?
                .encrypt_padded_vec_mut::<Pkcs7>(bytes),
            KeySize::Aes256 => cbc::Encryptor::<Aes256>::new_from_slices(&self.key, &self.iv)
                .map_err(AppError::encoding)?
                .encrypt_padded_vec_mut::<Pkcs7>(bytes),
        };
        Ok(general_purpose::STANDARD.encode(ciphertext))
    }

    /// Encrypt `plaintext` and pair it with the declared IV.
    pub fn seal(&self, plaintext: &str) -> Result<EncryptedEnvelope> {
        Ok(EncryptedEnvelope {
            ciphertext: self.encrypt(plaintext)?,
            iv: self.declared_iv.clone(),
        })
    }

    /// Reverse of [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<String> {
        let ciphertext = general_purpose::STANDARD
            .decode(ciphertext_b64.trim())
            .map_err(|e| AppError::encoding(format!("ciphertext is not valid base64: {e}")))?;
        if ciphertext.is_empty() {
            return Err(AppError::encoding("ciphertext is empty"));
        }

        let unpad = |e: UnpadError| AppError::encoding(format!("decryption failed: {e}"));
        let plaintext = match self.key_size {
            KeySize::Aes128 => cbc::Decryptor::<Aes128>::new_from_slices(&self.key, &self.iv)
                .map_err(AppError::encoding)?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
                .map_err(unpad)?,
            KeySize::Aes192 => cbc::Decryptor::<Aes192>::new_from_slices(&self.key, &self.iv)
                .map_err(AppError::encoding)?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
                .map_err(unpad)?,
            KeySize::Aes256 => cbc::Decryptor::<Aes256>::new_from_slices(&self.key, &self.iv)
                .map_err(AppError::encoding)?
                .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
                .map_err(unpad)?,
        };

        String::from_utf8(plaintext)
            .map_err(|e| AppError::encoding(format!("plaintext is not UTF-8: {e}")))
    }
}

impl fmt::Debug for SecureChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureChannel")
            .field("key_size", &self.key_size)
            .finish_non_exhaustive()
    }
}
