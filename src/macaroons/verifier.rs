use super::{chain, Macaroon, RootKey, VerificationError};
use std::fmt;
use tracing::{debug, instrument};

/// Something a caveat predicate can be checked against.
pub trait Predicate: Send + Sync {
    fn satisfies(&self, predicate: &str) -> bool;
}

/// Satisfied by a caveat whose predicate is exactly this string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exact(String);

impl Exact {
    pub fn new(predicate: impl Into<String>) -> Self {
        Self(predicate.into())
    }
}

impl Predicate for Exact {
    fn satisfies(&self, predicate: &str) -> bool {
        self.0 == predicate
    }
}

impl<F> Predicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn satisfies(&self, predicate: &str) -> bool {
        self(predicate)
    }
}

/// Checks a macaroon signature and then every caveat against an ordered list
/// of predicates.
///
/// A caveat is satisfied when any one of the predicates accepts it.
#[derive(Default)]
pub struct Verifier {
    predicates: Vec<Box<dyn Predicate>>,
}

impl Verifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept caveats equal to `predicate`.
    #[must_use]
    pub fn satisfy_exact(self, predicate: impl Into<String>) -> Self {
        self.satisfy(Exact::new(predicate))
    }

    /// Accept caveats for which `check` returns true.
    #[must_use]
    pub fn satisfy_general<F>(self, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.satisfy(check)
    }

    #[must_use]
    pub fn satisfy(mut self, predicate: impl Predicate + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Verify `macaroon` against `key`.
    ///
    /// The signature is checked first; caveats of a forged macaroon are never
    /// evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::SignatureMismatch`] if the signature chain
    /// does not match, or [`VerificationError::CaveatUnsatisfied`] naming the
    /// first caveat no predicate accepts. A caveat that is not valid UTF-8 is
    /// never accepted.
    #[instrument(
        level = "debug",
        skip_all,
        fields(identifier = %String::from_utf8_lossy(macaroon.identifier()))
    )]
    pub fn verify(&self, macaroon: &Macaroon, key: &RootKey) -> Result<(), VerificationError> {
        let expected = chain::fold(key, macaroon.identifier(), macaroon.caveats());

        if !chain::tags_match(&expected, macaroon.signature()) {
            debug!("signature mismatch");
            return Err(VerificationError::SignatureMismatch);
        }

        for caveat in macaroon.caveats() {
            let satisfied = caveat
                .as_str()
                .is_some_and(|predicate| self.predicates.iter().any(|p| p.satisfies(predicate)));
            if !satisfied {
                debug!(caveat = %caveat, "caveat not satisfied");
                return Err(VerificationError::CaveatUnsatisfied(caveat.to_string()));
            }
        }

        Ok(())
    }

    /// Boolean form of [`Verifier::verify`].
    #[must_use]
    pub fn accepts(&self, macaroon: &Macaroon, key: &RootKey) -> bool {
        self.verify(macaroon, key).is_ok()
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// Identity carried by a macaroon that passed verification.
///
/// The identifier is handed over as the signed bytes; turning it into text
/// is up to whoever maps it onto an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub location: String,
    pub identifier: Vec<u8>,
}

/// Decode and verify a serialized token in one step.
///
/// # Errors
///
/// Returns [`VerificationError::Decode`] for malformed tokens and the errors
/// of [`Verifier::verify`] otherwise.
pub fn verify_token(
    token: &str,
    key: &RootKey,
    verifier: &Verifier,
) -> Result<VerifiedIdentity, VerificationError> {
    let macaroon = Macaroon::deserialize(token)?;
    verifier.verify(&macaroon, key)?;

    Ok(VerifiedIdentity {
        location: macaroon.location().to_string(),
        identifier: macaroon.identifier().to_vec(),
    })
}
