use crate::auth::{AuthConfig, Authenticator};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use tracing::debug;

/// Where the macaroon comes from.
#[derive(Debug)]
pub enum Source {
    Token(SecretString),
    CookieHeader(SecretString),
}

#[derive(Debug)]
pub struct Args {
    pub source: Source,
    pub config: AuthConfig,
}

/// Verify the macaroon and write the login outcome as JSON.
///
/// Every rejection surfaces as the same "not authenticated" error, the
/// reason is only logged at debug level.
///
/// # Errors
/// Returns an error if the configuration is invalid or the macaroon is rejected.
pub fn execute(args: &Args, out: &mut impl Write) -> Result<()> {
    let authenticator = Authenticator::new(&args.config).context("invalid configuration")?;

    let result = match &args.source {
        Source::Token(token) => authenticator.authenticate(token.expose_secret()),
        Source::CookieHeader(header) => {
            authenticator.authenticate_cookie_header(header.expose_secret())
        }
    };

    let outcome = result.map_err(|err| {
        debug!("macaroon rejected: {err}");
        anyhow!("not authenticated")
    })?;

    writeln!(out, "{}", serde_json::to_string_pretty(&outcome)?)?;

    Ok(())
}
