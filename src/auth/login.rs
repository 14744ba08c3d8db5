//! Login flow: read the macaroon cookie, verify it, and map the identifier
//! onto an account.
//!
//! Every failure is reported to the caller as "no login"; the reason only
//! goes to the debug log so a rejected token and a missing cookie look the
//! same from outside.

use super::{
    config::MAX_CAVEAT_CONDITIONS, AuthConfig, AuthError, ConfigError, EmailTemplate,
    IdentifierTemplate,
};
use crate::macaroons::{verify_token, RootKey, Verifier};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::str;
use tracing::{debug, info, instrument};

/// What the account layer needs after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    pub email: String,
    pub location: String,
}

impl LoginOutcome {
    #[must_use]
    pub fn matches(&self, username: &str) -> bool {
        self.login == username
    }
}

/// Whether `username` is the account a previous [`Authenticator`] call let in.
#[must_use]
pub fn user_login(outcome: Option<&LoginOutcome>, username: &str) -> bool {
    outcome.is_some_and(|outcome| outcome.matches(username))
}

/// Value of cookie `name` in a `Cookie` header.
#[must_use]
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key.trim() != name {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then_some(value)
    })
}

#[derive(Debug)]
pub struct Authenticator {
    cookie_name: String,
    root_key: RootKey,
    verifier: Verifier,
    identifier: IdentifierTemplate,
    email: EmailTemplate,
}

impl Authenticator {
    /// Validate `config` and prepare everything a login needs.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty cookie name or secret, too many
    /// caveat conditions, or an invalid template.
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigError> {
        if config.cookie_name.trim().is_empty() {
            return Err(ConfigError::EmptyCookieName);
        }

        if config.caveat_conditions.len() > MAX_CAVEAT_CONDITIONS {
            return Err(ConfigError::TooManyConditions {
                max: MAX_CAVEAT_CONDITIONS,
                got: config.caveat_conditions.len(),
            });
        }

        let root_key = RootKey::derive(config.secret.expose_secret().as_bytes())
            .map_err(|_| ConfigError::EmptySecret)?;

        let verifier = config
            .caveat_conditions
            .iter()
            .filter(|condition| !condition.is_empty())
            .fold(Verifier::new(), |verifier, condition| {
                verifier.satisfy_exact(condition.as_str())
            });

        let identifier = IdentifierTemplate::parse(&config.identifier_format)
            .map_err(ConfigError::IdentifierFormat)?;
        let email =
            EmailTemplate::parse(&config.email_template).map_err(ConfigError::EmailTemplate)?;

        debug!(
            cookie = %config.cookie_name,
            conditions = verifier.len(),
            "authenticator configured"
        );

        Ok(Self {
            cookie_name: config.cookie_name.clone(),
            root_key,
            verifier,
            identifier,
            email,
        })
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Verify `token` and derive the account it logs in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Verification`] if the token is malformed, forged
    /// or restricted, and [`AuthError::UnmappedIdentity`] if its identifier
    /// is not UTF-8 text or does not fit the configured format.
    #[instrument(level = "debug", skip_all)]
    pub fn authenticate(&self, token: &str) -> Result<LoginOutcome, AuthError> {
        let identity = verify_token(token, &self.root_key, &self.verifier)?;

        let identifier =
            str::from_utf8(&identity.identifier).map_err(|_| AuthError::UnmappedIdentity)?;
        let fields = self.identifier.map(identifier);
        let login = fields.login_name().ok_or(AuthError::UnmappedIdentity)?;
        let email = self.email.render(&fields);

        info!(login = %login, "macaroon login accepted");

        Ok(LoginOutcome {
            login,
            firstname: fields.firstname,
            lastname: fields.lastname,
            email,
            location: identity.location,
        })
    }

    /// Authenticate from a raw `Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCookie`] if the configured cookie is absent,
    /// otherwise the errors of [`Authenticator::authenticate`].
    pub fn authenticate_cookie_header(&self, header: &str) -> Result<LoginOutcome, AuthError> {
        let token = cookie_value(header, &self.cookie_name).ok_or(AuthError::MissingCookie)?;
        self.authenticate(token)
    }

    /// Login page hook: `Some` only for a valid macaroon cookie.
    #[must_use]
    pub fn login_from_cookie_header(&self, header: &str) -> Option<LoginOutcome> {
        match self.authenticate_cookie_header(header) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                debug!("macaroon login refused: {err}");
                None
            }
        }
    }
}
