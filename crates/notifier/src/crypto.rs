//! Web Push message encryption and VAPID request signing.
//!
//! Payloads are encrypted with the `aes128gcm` content coding: an ephemeral
//! P-256 ECDH agreement with the browser key, HKDF-SHA256 key derivation
//! mixed with the subscription auth secret, and a single AES-128-GCM record.
//! The request is authorized with an ES256 JWT signed by the application
//! server key.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use eyre::{Result, WrapErr, bail, eyre};
use ring::{
    aead, agreement, hkdf,
    rand::{SecureRandom, SystemRandom},
    signature::{self, EcdsaKeyPair, KeyPair},
};
use serde_json::json;

/// Record size advertised in the content-coding header.
pub const RECORD_SIZE: u32 = 4096;
pub const PUBLIC_KEY_LEN: usize = 65;
pub const AUTH_SECRET_LEN: usize = 16;
pub const SALT_LEN: usize = 16;
/// Salt, record size and key id length that precede the key id.
pub const HEADER_LEN: usize = SALT_LEN + 4 + 1;

const VAPID_TTL_HOURS: i64 = 12;
/// Padding delimiter marking the last (and only) record.
const LAST_RECORD: u8 = 0x02;

/// Decodes base64url, with or without trailing padding.
pub fn decode_base64url(value: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(value.trim().trim_end_matches('='))
        .wrap_err("Invalid base64url value")
}

struct OkmLen(usize);

impl hkdf::KeyType for OkmLen {
    fn len(&self) -> usize {
        self.0
    }
}

fn hkdf_expand(prk: &hkdf::Prk, info: &[&[u8]], out: &mut [u8]) -> Result<()> {
    prk.expand(info, OkmLen(out.len()))
        .and_then(|okm| okm.fill(out))
        .map_err(|_| eyre!("HKDF expansion failed"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKeys {
    pub cek: [u8; 16],
    pub nonce: [u8; 12],
}

/// Derives the content encryption key and nonce for one message.
pub fn derive_content_keys(
    shared_secret: &[u8],
    auth_secret: &[u8],
    ua_public: &[u8],
    as_public: &[u8],
    salt: &[u8],
) -> Result<ContentKeys> {
    let prk_key = hkdf::Salt::new(hkdf::HKDF_SHA256, auth_secret).extract(shared_secret);
    let mut ikm = [0u8; 32];
    hkdf_expand(
        &prk_key,
        &[b"WebPush: info\0".as_slice(), ua_public, as_public],
        &mut ikm,
    )?;

    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, salt).extract(&ikm);
    let mut cek = [0u8; 16];
    hkdf_expand(&prk, &[b"Content-Encoding: aes128gcm\0".as_slice()], &mut cek)?;
    let mut nonce = [0u8; 12];
    hkdf_expand(&prk, &[b"Content-Encoding: nonce\0".as_slice()], &mut nonce)?;

    Ok(ContentKeys { cek, nonce })
}

/// Encrypts `plaintext` for a subscription's `p256dh` key and `auth` secret.
pub fn encrypt_payload(plaintext: &[u8], ua_public: &[u8], auth_secret: &[u8]) -> Result<Vec<u8>> {
    if ua_public.len() != PUBLIC_KEY_LEN {
        bail!("Subscription key must be {} bytes, got {}", PUBLIC_KEY_LEN, ua_public.len());
    }
    if auth_secret.len() != AUTH_SECRET_LEN {
        bail!("Auth secret must be {} bytes, got {}", AUTH_SECRET_LEN, auth_secret.len());
    }

    let rng = SystemRandom::new();
    let private_key = agreement::EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng)
        .map_err(|_| eyre!("Failed to generate ECDH key"))?;
    let as_public = private_key
        .compute_public_key()
        .map_err(|_| eyre!("Failed to compute ECDH public key"))?
        .as_ref()
        .to_vec();

    let peer = agreement::UnparsedPublicKey::new(&agreement::ECDH_P256, ua_public);
    let shared_secret = agreement::agree_ephemeral(private_key, &peer, |secret| secret.to_vec())
        .map_err(|_| eyre!("ECDH agreement with subscription key failed"))?;

    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| eyre!("Failed to generate salt"))?;

    seal_record(plaintext, &shared_secret, auth_secret, ua_public, &as_public, &salt)
}

/// Builds the `aes128gcm` body once the ECDH secret and salt are known.
pub fn seal_record(
    plaintext: &[u8],
    shared_secret: &[u8],
    auth_secret: &[u8],
    ua_public: &[u8],
    as_public: &[u8],
    salt: &[u8],
) -> Result<Vec<u8>> {
    let keys = derive_content_keys(shared_secret, auth_secret, ua_public, as_public, salt)?;
    let key = aead::UnboundKey::new(&aead::AES_128_GCM, &keys.cek)
        .map(aead::LessSafeKey::new)
        .map_err(|_| eyre!("Invalid content encryption key"))?;

    let mut record = Vec::with_capacity(plaintext.len() + 1 + aead::AES_128_GCM.tag_len());
    record.extend_from_slice(plaintext);
    record.push(LAST_RECORD);
    key.seal_in_place_append_tag(
        aead::Nonce::assume_unique_for_key(keys.nonce),
        aead::Aad::empty(),
        &mut record,
    )
    .map_err(|_| eyre!("Payload encryption failed"))?;

    if record.len() > RECORD_SIZE as usize {
        bail!("Push payload too large: {} bytes", plaintext.len());
    }

    let mut body = Vec::with_capacity(HEADER_LEN + as_public.len() + record.len());
    body.extend_from_slice(salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(as_public.len() as u8);
    body.extend_from_slice(as_public);
    body.extend_from_slice(&record);
    Ok(body)
}

/// The push service origin a VAPID token is scoped to.
pub fn audience(endpoint: &str) -> Result<String> {
    let url = reqwest::Url::parse(endpoint)
        .wrap_err_with(|| format!("Invalid push endpoint {}", endpoint))?;
    Ok(url.origin().ascii_serialization())
}

/// Signs VAPID `Authorization` headers with the application server key.
pub struct VapidSigner {
    key_pair: EcdsaKeyPair,
    public_key: String,
    subject: String,
    rng: SystemRandom,
}

impl VapidSigner {
    pub fn new(public_key: &str, private_key: &str, subject: &str) -> Result<Self> {
        let public = decode_base64url(public_key).wrap_err("Invalid VAPID public key")?;
        let private = decode_base64url(private_key).wrap_err("Invalid VAPID private key")?;

        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_private_key_and_public_key(
            &signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            &private,
            &public,
            &rng,
        )
        .map_err(|e| eyre!("Invalid VAPID key pair: {}", e))?;
        let public_key = URL_SAFE_NO_PAD.encode(key_pair.public_key().as_ref());

        Ok(Self {
            key_pair,
            public_key,
            subject: subject.to_string(),
            rng,
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Signs a token for `endpoint` valid for twelve hours from `now`.
    pub fn sign_token(&self, endpoint: &str, now: DateTime<Utc>) -> Result<String> {
        let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT","alg":"ES256"}"#);
        let claims = json!({
            "aud": audience(endpoint)?,
            "exp": (now + Duration::hours(VAPID_TTL_HOURS)).timestamp(),
            "sub": self.subject,
        });
        let claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);

        let signing_input = format!("{}.{}", header, claims);
        let signature = self
            .key_pair
            .sign(&self.rng, signing_input.as_bytes())
            .map_err(|_| eyre!("Failed to sign VAPID token"))?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.as_ref())
        ))
    }

    /// The full `Authorization` header value for a request to `endpoint`.
    pub fn authorization(&self, endpoint: &str, now: DateTime<Utc>) -> Result<String> {
        Ok(format!(
            "vapid t={}, k={}",
            self.sign_token(endpoint, now)?,
            self.public_key
        ))
    }
}
