//! Handshake payload codec.
//!
//! Wire format: the fields are serialized as a form-encoded query string,
//! encrypted with AES-256-ECB (PKCS#7 padding) under `SHA-256(shared_secret)`,
//! then base64-encoded with `+`/`/` rewritten to `-`/`_` and padding removed.
//!
//! ECB and the unsalted key derivation are what the partner implementation
//! expects. Identical payloads produce identical tokens.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use url::form_urlencoded;

type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

/// Ordered handshake fields.
///
/// Built fresh for every handshake and never persisted in plaintext.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HandshakeArgs {
    fields: Vec<(String, String)>,
}

impl HandshakeArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`HandshakeArgs::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, keeping its original position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Values may include the shared secret.
impl std::fmt::Debug for HandshakeArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeArgs")
            .field("keys", &self.fields.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}

/// Serialize fields as `key=value&key=value` in insertion order.
#[must_use]
pub fn serialize(args: &HandshakeArgs) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(args.iter())
        .finish()
}

fn derive_key(secret: &str) -> aes::cipher::Key<Aes256> {
    Sha256::digest(secret.as_bytes())
}

/// Encode fields into a transport-safe token.
#[must_use]
pub fn encode(args: &HandshakeArgs, secret: &str) -> String {
    let key = derive_key(secret);
    let ciphertext =
        Aes256EcbEnc::new(&key).encrypt_padded_vec_mut::<Pkcs7>(serialize(args).as_bytes());

    BASE64
        .encode(ciphertext)
        .replace('+', "-")
        .replace('/', "_")
        .replace('=', "")
        .trim()
        .to_string()
}

/// Decode a token back into its serialized plaintext.
///
/// Never fails: empty input, malformed base64, a wrong key or broken padding
/// all produce an empty string. Callers treat the output as untrusted.
#[must_use]
pub fn decode(token: &str, secret: &str) -> String {
    let token = token.trim();
    if token.is_empty() {
        return String::new();
    }

    let mut standard = token.replace('-', "+").replace('_', "/");
    let remainder = standard.len() % 4;
    if remainder != 0 {
        standard.extend(std::iter::repeat('=').take(4 - remainder));
    }

    let Ok(ciphertext) = BASE64.decode(standard.as_bytes()) else {
        return String::new();
    };

    let key = derive_key(secret);
    match Aes256EcbDec::new(&key).decrypt_padded_vec_mut::<Pkcs7>(&ciphertext) {
        Ok(plaintext) => String::from_utf8_lossy(&plaintext).trim().to_string(),
        Err(_) => String::new(),
    }
}

/// Pull one field out of decoded plaintext.
///
/// Keys match case-insensitively and the first match wins. Values are
/// URL-decoded. A missing key yields an empty string.
#[must_use]
pub fn extract_field(plaintext: &str, key: &str) -> String {
    for pair in plaintext.split('&') {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if name.eq_ignore_ascii_case(key) {
            let spaced = value.replace('+', " ");
            return urlencoding::decode(&spaced)
                .map(std::borrow::Cow::into_owned)
                .unwrap_or(spaced);
        }
    }
    String::new()
}
