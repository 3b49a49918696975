//! # Keypair Lifecycle
//!
//! A [`Keypair`] carries identifier, controller, expiry/revocation
//! metadata, and the key material itself. It is constructed bare, filled
//! by [`Keypair::initialize`] through the injected BBS backend, and
//! travels as a [`VerificationMethod`] in either Multikey or JWK form.
//!
//! Secret material is held privately and redacted from `Debug`; the
//! struct does not implement `Serialize` — export goes through the typed
//! verification-method documents only.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::Value;

use sdvc_core::{Result, SuiteError};

use crate::bbs::BbsSignatures;
use crate::codec::{
    jwk_thumbprint, jwk_to_material, material_to_jwk, material_to_multibase,
    multibase_to_material,
};
use crate::material::{KeyFlag, KeyMaterial, SECRET_KEY_LENGTH};
use crate::verification_method::{
    context_entries, JsonWebKeyMethod, MultikeyMethod, VerificationMethod, CONTEXT_ALLOWLIST,
    JWK_CONTEXT, MULTIKEY_CONTEXT,
};

/// The wire form requested from [`Keypair::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    /// Multibase-encoded key strings.
    #[default]
    Multikey,
    /// JWK objects.
    JsonWebKey,
}

/// Options for [`Keypair::export`].
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Which half of the keypair to export. Exporting the private half
    /// also includes the public half when present.
    pub flag: KeyFlag,
    /// The verification-method form to emit.
    pub kind: MethodKind,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            flag: KeyFlag::Public,
            kind: MethodKind::Multikey,
        }
    }
}

/// Options for [`Keypair::import`]. All checks default to enabled; setting
/// a flag to `false` skips that validation.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Validate the document's `@context` against the allowlist.
    pub check_context: bool,
    /// Reject documents whose `expires` lies in the past.
    pub check_expired: bool,
    /// Reject documents whose `revoked` lies in the past.
    pub check_revoked: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            check_context: true,
            check_expired: true,
            check_revoked: true,
        }
    }
}

/// A BLS12-381 G2 keypair with its verification-method metadata.
#[derive(Clone, Default)]
pub struct Keypair {
    /// Method identifier; `controller + "#" + fingerprint` once finalized.
    pub id: Option<String>,
    /// Controller URI.
    pub controller: Option<String>,
    /// Expiry timestamp, if the method expires.
    pub expires: Option<DateTime<Utc>>,
    /// Revocation timestamp, if the method was revoked.
    pub revoked: Option<DateTime<Utc>>,
    secret_key: Option<KeyMaterial>,
    public_key: Option<KeyMaterial>,
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("id", &self.id)
            .field("controller", &self.controller)
            .field("expires", &self.expires)
            .field("revoked", &self.revoked)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<private>"))
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl Keypair {
    /// Create a bare keypair with no material.
    pub fn new(controller: Option<String>) -> Self {
        Self {
            controller,
            ..Self::default()
        }
    }

    /// The secret key material, if present.
    pub fn secret_key(&self) -> Option<&KeyMaterial> {
        self.secret_key.as_ref()
    }

    /// The public key material, if present.
    pub fn public_key(&self) -> Option<&KeyMaterial> {
        self.public_key.as_ref()
    }

    /// Generate key material through the BBS backend.
    ///
    /// With no seed, 32 cryptographically-random bytes are drawn from the
    /// operating system. A supplied seed must be at least
    /// [`SECRET_KEY_LENGTH`] bytes. When a controller is set and no `id`
    /// has been assigned, the identifier becomes
    /// `controller + "#" + fingerprint`.
    pub fn initialize(&mut self, bbs: &dyn BbsSignatures, seed: Option<&[u8]>) -> Result<()> {
        let seed_bytes: Vec<u8> = match seed {
            Some(seed) => {
                if seed.len() < SECRET_KEY_LENGTH {
                    return Err(SuiteError::invalid_length(
                        "keypair::initialize",
                        format!(
                            "seed must be at least {SECRET_KEY_LENGTH} bytes, got {}",
                            seed.len()
                        ),
                    ));
                }
                seed.to_vec()
            }
            None => {
                let mut buf = vec![0u8; SECRET_KEY_LENGTH];
                OsRng.fill_bytes(&mut buf);
                buf
            }
        };
        let (secret, public) = bbs.generate_key_pair(&seed_bytes)?;
        self.secret_key = Some(KeyMaterial::from_bytes(KeyFlag::Private, &secret)?);
        self.public_key = Some(KeyMaterial::from_bytes(KeyFlag::Public, &public)?);
        if self.id.is_none() {
            if let Some(controller) = &self.controller {
                let fingerprint = self.generate_fingerprint()?;
                self.id = Some(format!("{controller}#{fingerprint}"));
            }
        }
        Ok(())
    }

    /// The multibase fingerprint of the public key.
    pub fn generate_fingerprint(&self) -> Result<String> {
        let public = self.public_key.as_ref().ok_or_else(|| {
            SuiteError::export("keypair::generate_fingerprint", "no public key material")
        })?;
        material_to_multibase(public.as_bytes(), KeyFlag::Public)
    }

    /// Whether `fingerprint` matches this keypair's public key.
    pub fn verify_fingerprint(&self, fingerprint: &str) -> bool {
        self.generate_fingerprint()
            .map(|expected| expected == fingerprint)
            .unwrap_or(false)
    }

    /// Export as a verification-method document.
    ///
    /// # Errors
    ///
    /// `KEYPAIR_EXPORT_ERROR` when the requested material, the identifier,
    /// or the controller is missing, or the identifier does not extend the
    /// controller.
    pub fn export(&self, options: &ExportOptions) -> Result<VerificationMethod> {
        const OP: &str = "keypair::export";
        let id = self
            .id
            .as_ref()
            .ok_or_else(|| SuiteError::export(OP, "keypair has no id"))?;
        let controller = self
            .controller
            .as_ref()
            .ok_or_else(|| SuiteError::export(OP, "keypair has no controller"))?;
        if !id.starts_with(controller.as_str()) {
            return Err(SuiteError::export(
                OP,
                format!("id {id:?} does not start with controller {controller:?}"),
            ));
        }
        let requested = match options.flag {
            KeyFlag::Public => &self.public_key,
            KeyFlag::Private => &self.secret_key,
        };
        if requested.is_none() {
            return Err(SuiteError::export(
                OP,
                format!("no {} key material to export", options.flag.as_str()),
            ));
        }

        match options.kind {
            MethodKind::Multikey => {
                let public_key_multibase = self
                    .public_key
                    .as_ref()
                    .map(|m| material_to_multibase(m.as_bytes(), KeyFlag::Public))
                    .transpose()?;
                let secret_key_multibase = match options.flag {
                    KeyFlag::Private => self
                        .secret_key
                        .as_ref()
                        .map(|m| material_to_multibase(m.as_bytes(), KeyFlag::Private))
                        .transpose()?,
                    KeyFlag::Public => None,
                };
                Ok(VerificationMethod::Multikey(MultikeyMethod {
                    context: Some(Value::String(MULTIKEY_CONTEXT.to_string())),
                    id: id.clone(),
                    controller: controller.clone(),
                    expires: self.expires.map(format_timestamp),
                    revoked: self.revoked.map(format_timestamp),
                    public_key_multibase,
                    secret_key_multibase,
                }))
            }
            MethodKind::JsonWebKey => {
                let public_key_jwk = self
                    .public_key
                    .as_ref()
                    .map(|m| material_to_jwk(m.as_bytes(), KeyFlag::Public))
                    .transpose()?;
                let secret_key_jwk = match options.flag {
                    KeyFlag::Private => self
                        .secret_key
                        .as_ref()
                        .map(|m| material_to_jwk(m.as_bytes(), KeyFlag::Private))
                        .transpose()?,
                    KeyFlag::Public => None,
                };
                // The thumbprint-derived id requires a public JWK; with
                // only a secret key the id stays as provided.
                let id = match &public_key_jwk {
                    Some(jwk) => format!("{controller}#{}", jwk_thumbprint(jwk)?),
                    None => id.clone(),
                };
                Ok(VerificationMethod::JsonWebKey(JsonWebKeyMethod {
                    context: Some(Value::String(JWK_CONTEXT.to_string())),
                    id,
                    controller: controller.clone(),
                    expires: self.expires.map(format_timestamp),
                    revoked: self.revoked.map(format_timestamp),
                    public_key_jwk,
                    secret_key_jwk,
                }))
            }
        }
    }

    /// Import a keypair from a verification-method JSON document.
    ///
    /// # Errors
    ///
    /// `KEYPAIR_IMPORT_ERROR` for an unknown `type` or disallowed context;
    /// `KEYPAIR_EXPIRED_ERROR` for a past expiry/revocation when checked;
    /// `INVALID_KEYPAIR_CONTENT` when neither key is present.
    pub fn import(document: &Value, options: &ImportOptions) -> Result<Self> {
        const OP: &str = "keypair::import";
        let method: VerificationMethod = serde_json::from_value(document.clone())
            .map_err(|e| SuiteError::import(OP, format!("not a verification method: {e}")))?;

        if options.check_context {
            let context = method.context().ok_or_else(|| {
                SuiteError::import(OP, "verification method declares no @context")
            })?;
            for entry in context_entries(context) {
                if !CONTEXT_ALLOWLIST.contains(&entry) {
                    return Err(SuiteError::import(
                        OP,
                        format!("context {entry:?} is not allowlisted"),
                    ));
                }
            }
        }

        let expires = parse_optional_timestamp(method.expires(), "expires")?;
        let revoked = parse_optional_timestamp(method.revoked(), "revoked")?;
        let now = Utc::now();
        if options.check_expired {
            if let Some(expires) = expires {
                if expires < now {
                    return Err(SuiteError::expired(
                        OP,
                        format!("verification method expired at {}", format_timestamp(expires)),
                    ));
                }
            }
        }
        if options.check_revoked {
            if let Some(revoked) = revoked {
                if revoked < now {
                    return Err(SuiteError::expired(
                        OP,
                        format!("verification method revoked at {}", format_timestamp(revoked)),
                    ));
                }
            }
        }

        let (secret_key, public_key) = match &method {
            VerificationMethod::Multikey(m) => {
                let public = m
                    .public_key_multibase
                    .as_deref()
                    .map(|s| multibase_to_material(s, KeyFlag::Public))
                    .transpose()?;
                let secret = m
                    .secret_key_multibase
                    .as_deref()
                    .map(|s| multibase_to_material(s, KeyFlag::Private))
                    .transpose()?;
                (secret, public)
            }
            VerificationMethod::JsonWebKey(m) => {
                let public = m
                    .public_key_jwk
                    .as_ref()
                    .map(|jwk| jwk_to_material(jwk, KeyFlag::Public))
                    .transpose()?;
                let secret = m
                    .secret_key_jwk
                    .as_ref()
                    .map(|jwk| jwk_to_material(jwk, KeyFlag::Private))
                    .transpose()?;
                (secret, public)
            }
        };
        if secret_key.is_none() && public_key.is_none() {
            return Err(SuiteError::invalid_content(
                OP,
                "verification method carries neither a public nor a secret key",
            ));
        }

        Ok(Self {
            id: Some(method.id().to_string()),
            controller: Some(method.controller().to_string()),
            expires,
            revoked,
            secret_key,
            public_key,
        })
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn parse_optional_timestamp(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    SuiteError::import(
                        "keypair::import",
                        format!("invalid {field} timestamp {s:?}: {e}"),
                    )
                })
        })
        .transpose()
}
