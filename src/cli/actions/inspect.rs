use crate::macaroons::Macaroon;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;

#[derive(Debug)]
pub struct Args {
    pub token: SecretString,
}

/// Print the decoded packets of a macaroon, the signature is not checked.
///
/// # Errors
/// Returns an error if the token cannot be decoded.
pub fn execute(args: &Args, out: &mut impl Write) -> Result<()> {
    let macaroon =
        Macaroon::deserialize(args.token.expose_secret()).context("failed to decode macaroon")?;

    writeln!(out, "{}", macaroon.inspect())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITH_CAVEAT: &str = "MDAxY2xvY2F0aW9uIGh0dHA6Ly9teWJhbmsvCjAwMjZpZGVudGlmaWVyIHdlIHVzZWQgb3VyIHNlY3JldCBrZXkKMDAxZGNpZCBhY2NvdW50ID0gMzczNTkyODU1OQowMDJmc2lnbmF0dXJlIB7-R2PykNvODB0IR3Nn4R9O7kVqZJM89mLXl3LbuCEoCg";

    #[test]
    fn test_execute_rejects_garbage() {
        let args = Args {
            token: SecretString::from("not a macaroon"),
        };
        let mut out = Vec::new();
        let err = execute(&args, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "failed to decode macaroon");
        assert!(out.is_empty());
    }

    #[test]
    fn test_execute() {
        let args = Args {
            token: SecretString::from(WITH_CAVEAT),
        };
        let mut out = Vec::new();
        execute(&args, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "location http://mybank/\n\
             identifier we used our secret key\n\
             cid account = 3735928559\n\
             signature 1efe4763f290dbce0c1d08477367e11f4eee456a64933cf662d79772dbb82128\n"
        );
    }
}
