//! # Proof Features
//!
//! The closed set of cryptosuite features. Each feature owns a pair of
//! envelope header bytes (base and derived) and determines which optional
//! components travel in the proof value.

use sdvc_core::{Result, SuiteError};

/// The cryptosuite feature a proof was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Plain BBS selective disclosure.
    Baseline,
    /// The holder binds a secret commitment into the signature.
    AnonymousHolderBinding,
    /// Proofs disclose a per-domain pseudonym.
    Pseudonym,
    /// Pseudonym bound to a holder secret.
    HolderBindingPseudonym,
}

impl Default for Feature {
    fn default() -> Self {
        Feature::Baseline
    }
}

impl Feature {
    /// All features, in header-byte order.
    pub const ALL: [Feature; 4] = [
        Feature::Baseline,
        Feature::AnonymousHolderBinding,
        Feature::Pseudonym,
        Feature::HolderBindingPseudonym,
    ];

    /// The third header byte of a base proof value.
    pub fn base_header_byte(self) -> u8 {
        match self {
            Feature::Baseline => 0x02,
            Feature::AnonymousHolderBinding => 0x04,
            Feature::Pseudonym => 0x06,
            Feature::HolderBindingPseudonym => 0x08,
        }
    }

    /// The third header byte of a derived proof value.
    pub fn derived_header_byte(self) -> u8 {
        self.base_header_byte() + 1
    }

    /// Resolve a base header byte.
    pub fn from_base_header_byte(byte: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.base_header_byte() == byte)
            .ok_or_else(|| {
                SuiteError::verification(
                    "feature::from_base_header_byte",
                    format!("unknown base proof header byte 0x{byte:02x}"),
                )
            })
    }

    /// Resolve a derived header byte.
    pub fn from_derived_header_byte(byte: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.derived_header_byte() == byte)
            .ok_or_else(|| {
                SuiteError::verification(
                    "feature::from_derived_header_byte",
                    format!("unknown derived proof header byte 0x{byte:02x}"),
                )
            })
    }

    /// Whether base proofs carry `signerNymEntropy`.
    pub fn carries_nym_entropy(self) -> bool {
        matches!(self, Feature::Pseudonym | Feature::HolderBindingPseudonym)
    }

    /// Whether derived proofs carry `nymDomain` and `pseudonym`.
    pub fn carries_pseudonym(self) -> bool {
        self.carries_nym_entropy()
    }

    /// Whether derived proofs carry `lengthBBSMessages`.
    pub fn carries_message_count(self) -> bool {
        self != Feature::Baseline
    }

    /// Number of CBOR components in a base proof value.
    pub fn base_component_count(self) -> usize {
        if self.carries_nym_entropy() {
            6
        } else {
            5
        }
    }

    /// Number of CBOR components in a derived proof value.
    pub fn derived_component_count(self) -> usize {
        match self {
            Feature::Baseline => 5,
            Feature::AnonymousHolderBinding => 6,
            Feature::Pseudonym | Feature::HolderBindingPseudonym => 8,
        }
    }
}
