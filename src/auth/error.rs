use crate::macaroons::VerificationError;
use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder: {{{{{0}}}}}")]
    UnknownPlaceholder(String),
    #[error("placeholder used more than once: {{{{{0}}}}}")]
    DuplicatePlaceholder(String),
    #[error("identifier format has no placeholders")]
    NoPlaceholders,
    #[error("invalid placeholder pattern")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("cookie name must not be empty")]
    EmptyCookieName,
    #[error("secret must not be empty")]
    EmptySecret,
    #[error("at most {max} caveat conditions are supported, got {got}")]
    TooManyConditions { max: usize, got: usize },
    #[error("invalid identifier format: {0}")]
    IdentifierFormat(TemplateError),
    #[error("invalid email template: {0}")]
    EmailTemplate(TemplateError),
}

/// Why a login attempt was refused.
///
/// Only ever logged; callers present every variant the same way.
#[derive(Debug, PartialEq, Error)]
pub enum AuthError {
    #[error("no macaroon cookie")]
    MissingCookie,
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error("identifier does not match the configured format")]
    UnmappedIdentity,
}
