//! # Key Material — Tagged BLS12-381 G2 Key Bytes
//!
//! Defines [`KeyMaterial`], a tagged byte sequence whose length is enforced
//! by construction: 32 octets for a private key, 96 octets for a compressed
//! G2 public key. There is no way to hold key bytes of the wrong length.
//!
//! Private material is redacted from `Debug` output, matching the policy
//! that secret keys never reach logs.

use sdvc_core::{Result, SuiteError};

/// Length of a BLS12-381 private key in octets.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Length of a compressed BLS12-381 G2 public key in octets.
pub const PUBLIC_KEY_LENGTH: usize = 96;

/// Which half of a keypair a codec operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFlag {
    /// The 96-byte compressed G2 public key.
    Public,
    /// The 32-byte private key.
    Private,
}

impl KeyFlag {
    /// Expected key-material length for this flag.
    pub fn expected_len(self) -> usize {
        match self {
            KeyFlag::Public => PUBLIC_KEY_LENGTH,
            KeyFlag::Private => SECRET_KEY_LENGTH,
        }
    }

    /// The single JWK `key_ops` entry for this flag.
    pub fn key_op(self) -> &'static str {
        match self {
            KeyFlag::Public => "verify",
            KeyFlag::Private => "sign",
        }
    }

    /// Lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyFlag::Public => "public",
            KeyFlag::Private => "private",
        }
    }
}

/// A tagged key-material byte sequence.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// 96-byte compressed G2 public key.
    Public([u8; PUBLIC_KEY_LENGTH]),
    /// 32-byte private key.
    Private([u8; SECRET_KEY_LENGTH]),
}

impl KeyMaterial {
    /// Construct from raw bytes, enforcing the flag's length.
    ///
    /// # Errors
    ///
    /// `INVALID_KEYPAIR_LENGTH` when `bytes` does not match the flag's
    /// expected length.
    pub fn from_bytes(flag: KeyFlag, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != flag.expected_len() {
            return Err(SuiteError::invalid_length(
                "material::from_bytes",
                format!(
                    "{} key material must be {} bytes, got {}",
                    flag.as_str(),
                    flag.expected_len(),
                    bytes.len()
                ),
            ));
        }
        Ok(match flag {
            KeyFlag::Public => {
                let mut arr = [0u8; PUBLIC_KEY_LENGTH];
                arr.copy_from_slice(bytes);
                KeyMaterial::Public(arr)
            }
            KeyFlag::Private => {
                let mut arr = [0u8; SECRET_KEY_LENGTH];
                arr.copy_from_slice(bytes);
                KeyMaterial::Private(arr)
            }
        })
    }

    /// The flag matching this material's tag.
    pub fn flag(&self) -> KeyFlag {
        match self {
            KeyMaterial::Public(_) => KeyFlag::Public,
            KeyMaterial::Private(_) => KeyFlag::Private,
        }
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyMaterial::Public(bytes) => bytes,
            KeyMaterial::Private(bytes) => bytes,
        }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMaterial::Public(bytes) => {
                write!(f, "KeyMaterial::Public({}...)", hex_prefix(bytes))
            }
            KeyMaterial::Private(_) => write!(f, "KeyMaterial::Private(<private>)"),
        }
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}
