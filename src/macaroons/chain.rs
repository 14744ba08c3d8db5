//! HMAC-SHA256 signature chain.
//!
//! `tag0 = HMAC(root_key, identifier)` and every caveat extends the chain with
//! `tag_i = HMAC(tag_{i-1}, predicate)`. The final tag is the macaroon
//! signature, so dropping or reordering a caveat changes it.

use super::{Caveat, VerificationError};
use hmac::{
    digest::{generic_array::GenericArray, KeyInit},
    Hmac, Mac,
};
use secrecy::{ExposeSecret, SecretBox};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const TAG_LEN: usize = 32;

const BLOCK_LEN: usize = 64;

// "macaroons-key-generator" zero-padded to the tag length.
const KEY_GENERATOR: [u8; TAG_LEN] = *b"macaroons-key-generator\0\0\0\0\0\0\0\0\0";

pub type Tag = [u8; TAG_LEN];

/// Secret that roots the signature chain.
pub struct RootKey(SecretBox<Tag>);

impl RootKey {
    /// Use `bytes` as the root key as-is.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::InvalidKey`] unless `bytes` is exactly
    /// [`TAG_LEN`] bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerificationError> {
        let key: Tag = bytes
            .try_into()
            .map_err(|_| VerificationError::InvalidKey)?;
        Ok(Self(SecretBox::new(Box::new(key))))
    }

    /// Derive the root key from a shared secret the way macaroon issuers do:
    /// `HMAC(key = "macaroons-key-generator", msg = secret)`.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::InvalidKey`] if `secret` is empty.
    pub fn derive(secret: &[u8]) -> Result<Self, VerificationError> {
        if secret.is_empty() {
            return Err(VerificationError::InvalidKey);
        }
        Ok(Self(SecretBox::new(Box::new(hmac(&KEY_GENERATOR, secret)))))
    }

    fn tag(&self) -> &Tag {
        self.0.expose_secret()
    }
}

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RootKey([REDACTED])")
    }
}

/// First link of the chain.
#[must_use]
pub fn initial(key: &RootKey, identifier: &[u8]) -> Tag {
    hmac(key.tag(), identifier)
}

/// Bind one more caveat predicate to `tag`.
#[must_use]
pub fn extend(tag: &Tag, predicate: &[u8]) -> Tag {
    hmac(tag, predicate)
}

/// Compute the full chain over `identifier` and `caveats`, in order.
pub fn fold<'a, I>(key: &RootKey, identifier: &[u8], caveats: I) -> Tag
where
    I: IntoIterator<Item = &'a Caveat>,
{
    caveats
        .into_iter()
        .fold(initial(key, identifier), |tag, caveat| {
            extend(&tag, caveat.predicate())
        })
}

/// Constant-time tag equality.
#[must_use]
pub fn tags_match(expected: &Tag, actual: &Tag) -> bool {
    expected.as_slice().ct_eq(actual.as_slice()).into()
}

// HMAC zero-pads short keys to the block size; padding here is equivalent.
fn hmac(key: &Tag, message: &[u8]) -> Tag {
    let mut block = [0u8; BLOCK_LEN];
    block[..TAG_LEN].copy_from_slice(key);

    let mut mac = <HmacSha256 as KeyInit>::new(GenericArray::from_slice(&block));
    mac.update(message);

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}
