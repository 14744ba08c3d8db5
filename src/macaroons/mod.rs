//! First-party macaroon verification.
//!
//! Tokens are decoded by [`packet`], turned into a [`Macaroon`], and checked by
//! a [`Verifier`] that recomputes the HMAC [`chain`] from a [`RootKey`] before
//! evaluating caveats. Minting is left to the issuer.

mod caveat;
pub mod chain;
mod error;
mod macaroon;
pub mod packet;
mod verifier;

pub use self::caveat::Caveat;
pub use self::chain::{RootKey, Tag, TAG_LEN};
pub use self::error::{DecodeError, EncodeError, VerificationError};
pub use self::macaroon::Macaroon;
pub use self::verifier::{verify_token, Exact, Predicate, VerifiedIdentity, Verifier};
