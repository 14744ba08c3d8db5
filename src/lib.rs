//! # macaroon-auth
//!
//! Cookie based login with [macaroons](https://research.google/pubs/pub41892/):
//! bearer tokens whose identifier and caveats are bound together by a chain of
//! HMAC-SHA256 signatures rooted in a secret shared with the issuer.
//!
//! The [`macaroons`] module decodes and verifies tokens. The [`auth`] module
//! maps a verified identifier onto an account (login name, names, e-mail)
//! according to the configured templates. The [`cli`] module wires both into
//! the `macaroon-auth` binary.

pub mod auth;
pub mod cli;
pub mod macaroons;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
