use thiserror::Error;

/// Failure to turn a serialized token into a [`crate::macaroons::Macaroon`].
///
/// Decoding never touches key material, so these are always safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid base64 encoding")]
    Base64,
    #[error("malformed packet: {0}")]
    Malformed(&'static str),
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unexpected {0} field")]
    UnexpectedField(&'static str),
    #[error("third-party caveats are not supported")]
    UnsupportedCaveat,
    #[error("invalid signature length: {0}")]
    SignatureLength(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("{key} packet too large: {len} bytes")]
    PacketTooLarge { key: &'static str, len: usize },
}

/// Terminal outcome of a single verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("caveat not satisfied: {0}")]
    CaveatUnsatisfied(String),
    #[error("invalid root key")]
    InvalidKey,
}
